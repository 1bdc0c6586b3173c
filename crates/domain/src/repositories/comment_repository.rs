use crate::entities::Comment;
use crate::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Comment>, DomainError>;
    async fn find_by_post_id(&self, post_id: &str) -> Result<Vec<Comment>, DomainError>;
    async fn find_replies(&self, parent_comment_id: &str) -> Result<Vec<Comment>, DomainError>;
    async fn save(&self, comment: &Comment) -> Result<Comment, DomainError>;
    async fn update(&self, comment: &Comment) -> Result<Comment, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}
