use crate::entities::Follow;
use crate::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn find_relationship(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<Option<Follow>, DomainError>;
    async fn find_followers(&self, user_id: &str) -> Result<Vec<Follow>, DomainError>;
    async fn find_following(&self, user_id: &str) -> Result<Vec<Follow>, DomainError>;
    async fn save(&self, follow: &Follow) -> Result<Follow, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}
