use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::validation::{decrement, require_content, require_non_blank};
use crate::DomainError;

pub const POST_MAX_CONTENT_LENGTH: usize = 500;
pub const POST_MAX_IMAGES: usize = 5;

static HASHTAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#(\w+)").expect("hashtag pattern is valid"));
static MENTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)").expect("mention pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredPost")]
pub struct Post {
    #[serde(rename = "_id")]
    id: String,
    author_id: String,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    likes_count: u32,
    comments_count: u32,
    image_urls: Vec<String>,
    // Derived from content, see `retag`; never read back.
    hashtags: BTreeSet<String>,
    mentions: BTreeSet<String>,
}

/// Stored shape of a post. Tags are not read back; they are recomputed from
/// the content on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPost {
    #[serde(rename = "_id")]
    id: String,
    author_id: String,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    likes_count: u32,
    comments_count: u32,
    #[serde(default)]
    image_urls: Vec<String>,
}

impl From<StoredPost> for Post {
    fn from(stored: StoredPost) -> Self {
        let mut post = Self {
            id: stored.id,
            author_id: stored.author_id,
            content: stored.content,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            likes_count: stored.likes_count,
            comments_count: stored.comments_count,
            image_urls: stored.image_urls,
            hashtags: BTreeSet::new(),
            mentions: BTreeSet::new(),
        };
        post.retag();
        post
    }
}

impl Post {
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let author_id = author_id.into();
        let content = content.into();

        require_non_blank(&id, "Id")?;
        require_non_blank(&author_id, "Author ID")?;
        require_content(&content, POST_MAX_CONTENT_LENGTH)?;

        let mut post = Self {
            id,
            author_id,
            content,
            created_at: Utc::now(),
            updated_at: None,
            likes_count: 0,
            comments_count: 0,
            image_urls: Vec::new(),
            hashtags: BTreeSet::new(),
            mentions: BTreeSet::new(),
        };
        post.retag();
        Ok(post)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn content(&self) -> &str {
        &self.content
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

    pub fn comments_count(&self) -> u32 {
        self.comments_count
    }

    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn hashtags(&self) -> &BTreeSet<String> {
        &self.hashtags
    }

    pub fn mentions(&self) -> &BTreeSet<String> {
        &self.mentions
    }

    pub fn update_content(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        let content = content.into();
        require_content(&content, POST_MAX_CONTENT_LENGTH)?;

        self.content = content;
        self.updated_at = Some(Utc::now());
        self.retag();
        Ok(())
    }

    /// Appends all urls or none of them.
    pub fn add_image_urls<I>(&mut self, image_urls: I) -> Result<(), DomainError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let urls: Vec<String> = image_urls.into_iter().map(Into::into).collect();

        if self.image_urls.len() + urls.len() > POST_MAX_IMAGES {
            return Err(DomainError::validation(format!(
                "Cannot add more than {} images per post",
                POST_MAX_IMAGES
            )));
        }
        if urls.iter().any(|url| url.trim().is_empty()) {
            return Err(DomainError::validation("Image URL cannot be null or whitespace"));
        }

        self.image_urls.extend(urls);
        Ok(())
    }

    pub fn increment_likes_count(&mut self) {
        self.likes_count += 1;
    }

    pub fn decrement_likes_count(&mut self) -> Result<(), DomainError> {
        decrement(&mut self.likes_count, "Likes count")
    }

    pub fn increment_comments_count(&mut self) {
        self.comments_count += 1;
    }

    pub fn decrement_comments_count(&mut self) -> Result<(), DomainError> {
        decrement(&mut self.comments_count, "Comments count")
    }

    fn retag(&mut self) {
        self.hashtags = extract_hashtags(&self.content);
        self.mentions = extract_mentions(&self.content);
    }
}

pub fn extract_hashtags(content: &str) -> BTreeSet<String> {
    extract_tokens(&HASHTAG_REGEX, content)
}

pub fn extract_mentions(content: &str) -> BTreeSet<String> {
    extract_tokens(&MENTION_REGEX, content)
}

fn extract_tokens(pattern: &Regex, content: &str) -> BTreeSet<String> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|token| token.as_str().to_lowercase())
        .collect()
}
