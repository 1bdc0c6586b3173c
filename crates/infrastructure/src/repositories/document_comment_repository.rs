use std::sync::Arc;

use async_trait::async_trait;
use domain::{Comment, CommentRepository, DomainError};

use super::document_collection::{repository_error, TypedCollection};
use crate::database::{DocumentStore, Filter, FindOptions, SortOrder};

pub struct DocumentCommentRepository {
    comments: TypedCollection<Comment>,
}

impl DocumentCommentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            comments: TypedCollection::new(store, "comments"),
        }
    }

    fn oldest_first() -> FindOptions {
        FindOptions::sorted_by("createdAt", SortOrder::Ascending)
    }
}

#[async_trait]
impl CommentRepository for DocumentCommentRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Comment>, DomainError> {
        self.comments
            .find_one(Filter::eq("_id", id))
            .await
            .map_err(repository_error)
    }

    async fn find_by_post_id(&self, post_id: &str) -> Result<Vec<Comment>, DomainError> {
        self.comments
            .find_many(Filter::eq("postId", post_id), Self::oldest_first())
            .await
            .map_err(repository_error)
    }

    async fn find_replies(&self, parent_comment_id: &str) -> Result<Vec<Comment>, DomainError> {
        self.comments
            .find_many(Filter::eq("parentCommentId", parent_comment_id), Self::oldest_first())
            .await
            .map_err(repository_error)
    }

    async fn save(&self, comment: &Comment) -> Result<Comment, DomainError> {
        self.comments.insert(comment).await.map_err(repository_error)?;
        Ok(comment.clone())
    }

    async fn update(&self, comment: &Comment) -> Result<Comment, DomainError> {
        let found = self
            .comments
            .replace(comment.id(), comment)
            .await
            .map_err(repository_error)?;
        if !found {
            return Err(DomainError::CommentNotFound(comment.id().to_string()));
        }
        Ok(comment.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.comments.delete(id).await.map_err(repository_error)?;
        Ok(())
    }
}
