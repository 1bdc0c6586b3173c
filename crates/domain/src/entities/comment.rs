use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{decrement, require_content, require_non_blank};
use crate::DomainError;

pub const COMMENT_MAX_CONTENT_LENGTH: usize = 1000;

/// A comment on a post. Replies point at their parent by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    id: String,
    post_id: String,
    author_id: String,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_comment_id: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    likes_count: u32,
}

impl Comment {
    pub fn new(
        id: impl Into<String>,
        post_id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
        parent_comment_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let post_id = post_id.into();
        let author_id = author_id.into();
        let content = content.into();

        require_non_blank(&id, "Id")?;
        require_non_blank(&post_id, "Post ID")?;
        require_non_blank(&author_id, "Author ID")?;
        require_content(&content, COMMENT_MAX_CONTENT_LENGTH)?;
        if let Some(parent) = &parent_comment_id {
            require_non_blank(parent, "Parent comment ID")?;
        }

        Ok(Self {
            id,
            post_id,
            author_id,
            content,
            parent_comment_id,
            created_at: Utc::now(),
            updated_at: None,
            likes_count: 0,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn parent_comment_id(&self) -> Option<&str> {
        self.parent_comment_id.as_deref()
    }

    pub fn is_reply(&self) -> bool {
        self.parent_comment_id.is_some()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn likes_count(&self) -> u32 {
        self.likes_count
    }

    pub fn update_content(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        let content = content.into();
        require_content(&content, COMMENT_MAX_CONTENT_LENGTH)?;

        self.content = content;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn increment_likes_count(&mut self) {
        self.likes_count += 1;
    }

    pub fn decrement_likes_count(&mut self) -> Result<(), DomainError> {
        decrement(&mut self.likes_count, "Likes count")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_comment_is_not_a_reply() {
        let comment = Comment::new("c1", "p1", "u1", "nice", None).unwrap();
        assert!(!comment.is_reply());
        assert_eq!(comment.likes_count(), 0);
        assert!(comment.updated_at().is_none());
    }

    #[test]
    fn reply_keeps_parent_reference() {
        let reply = Comment::new("c2", "p1", "u2", "agreed", Some("c1".into())).unwrap();
        assert!(reply.is_reply());
        assert_eq!(reply.parent_comment_id(), Some("c1"));
    }

    #[test]
    fn blank_parent_reference_is_rejected() {
        assert!(matches!(
            Comment::new("c2", "p1", "u2", "agreed", Some("  ".into())),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn content_length_is_bounded() {
        assert!(Comment::new("c1", "p1", "u1", "x".repeat(1000), None).is_ok());
        assert!(Comment::new("c1", "p1", "u1", "x".repeat(1001), None).is_err());
        assert!(Comment::new("c1", "", "u1", "hi", None).is_err());
    }

    #[test]
    fn update_content_validates_and_stamps() {
        let mut comment = Comment::new("c1", "p1", "u1", "first", None).unwrap();
        assert!(comment.update_content("x".repeat(1001)).is_err());
        assert_eq!(comment.content(), "first");

        comment.update_content("edited").unwrap();
        assert_eq!(comment.content(), "edited");
        assert!(comment.updated_at().is_some());
    }

    #[test]
    fn likes_never_go_negative() {
        let mut comment = Comment::new("c1", "p1", "u1", "hi", None).unwrap();
        assert!(matches!(
            comment.decrement_likes_count(),
            Err(DomainError::StateError(_))
        ));
        assert_eq!(comment.likes_count(), 0);
    }
}
