use crate::entities::Post;
use crate::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>, DomainError>;
    async fn find_by_author_id(&self, author_id: &str) -> Result<Vec<Post>, DomainError>;
    async fn find_by_hashtag(&self, hashtag: &str) -> Result<Vec<Post>, DomainError>;
    async fn save(&self, post: &Post) -> Result<Post, DomainError>;
    async fn update(&self, post: &Post) -> Result<Post, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}
