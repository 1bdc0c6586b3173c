use crate::entities::{Follow, User};
use crate::errors::DomainError;
use crate::repositories::{FollowRepository, UserRepository};
use crate::services::new_id;
use std::sync::Arc;

/// Keeps the follow graph and both users' counters in step.
pub struct FollowService {
    follow_repository: Arc<dyn FollowRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl FollowService {
    pub fn new(
        follow_repository: Arc<dyn FollowRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            follow_repository,
            user_repository,
        }
    }

    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> Result<Follow, DomainError> {
        // Construct first so self-follow fails before any lookups
        let follow = Follow::new(new_id(), follower_id, followee_id)?;

        let mut follower = self.load_user(follower_id).await?;
        let mut followee = self.load_user(followee_id).await?;

        if self
            .follow_repository
            .find_relationship(follower_id, followee_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyFollowing(
                follower_id.to_string(),
                followee_id.to_string(),
            ));
        }

        let saved = self.follow_repository.save(&follow).await?;

        follower.increment_following_count();
        followee.increment_followers_count();
        self.user_repository.update(&follower).await?;
        self.user_repository.update(&followee).await?;

        Ok(saved)
    }

    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> Result<(), DomainError> {
        let follow = self
            .follow_repository
            .find_relationship(follower_id, followee_id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFollowing(follower_id.to_string(), followee_id.to_string())
            })?;

        let mut follower = self.load_user(follower_id).await?;
        let mut followee = self.load_user(followee_id).await?;

        // Counter checks run before the relationship is removed
        follower.decrement_following_count()?;
        followee.decrement_followers_count()?;

        self.follow_repository.delete(follow.id()).await?;
        self.user_repository.update(&follower).await?;
        self.user_repository.update(&followee).await?;

        Ok(())
    }

    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> Result<bool, DomainError> {
        Ok(self
            .follow_repository
            .find_relationship(follower_id, followee_id)
            .await?
            .is_some())
    }

    pub async fn get_followers(&self, user_id: &str) -> Result<Vec<Follow>, DomainError> {
        self.follow_repository.find_followers(user_id).await
    }

    pub async fn get_following(&self, user_id: &str) -> Result<Vec<Follow>, DomainError> {
        self.follow_repository.find_following(user_id).await
    }

    async fn load_user(&self, id: &str) -> Result<User, DomainError> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }
}
