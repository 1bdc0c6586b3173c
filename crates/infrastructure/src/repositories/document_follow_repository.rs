use std::sync::Arc;

use async_trait::async_trait;
use domain::{DomainError, Follow, FollowRepository};

use super::document_collection::{repository_error, TypedCollection};
use crate::database::{DocumentStore, Filter, FindOptions, SortOrder};
use crate::errors::StoreError;

pub struct DocumentFollowRepository {
    follows: TypedCollection<Follow>,
}

impl DocumentFollowRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            follows: TypedCollection::new(store, "follows"),
        }
    }

    fn oldest_first() -> FindOptions {
        FindOptions::sorted_by("createdAt", SortOrder::Ascending)
    }
}

#[async_trait]
impl FollowRepository for DocumentFollowRepository {
    async fn find_relationship(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<Option<Follow>, DomainError> {
        let filter = Filter::eq("followerId", follower_id).and("followeeId", followee_id);
        self.follows.find_one(filter).await.map_err(repository_error)
    }

    async fn find_followers(&self, user_id: &str) -> Result<Vec<Follow>, DomainError> {
        self.follows
            .find_many(Filter::eq("followeeId", user_id), Self::oldest_first())
            .await
            .map_err(repository_error)
    }

    async fn find_following(&self, user_id: &str) -> Result<Vec<Follow>, DomainError> {
        self.follows
            .find_many(Filter::eq("followerId", user_id), Self::oldest_first())
            .await
            .map_err(repository_error)
    }

    async fn save(&self, follow: &Follow) -> Result<Follow, DomainError> {
        self.follows.insert(follow).await.map_err(|e| match e {
            StoreError::DuplicateKey { .. } => DomainError::AlreadyFollowing(
                follow.follower_id().to_string(),
                follow.followee_id().to_string(),
            ),
            other => repository_error(other),
        })?;
        Ok(follow.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.follows.delete(id).await.map_err(repository_error)?;
        Ok(())
    }
}
