use std::sync::Arc;

use async_trait::async_trait;
use domain::{DomainError, User, UserRepository};

use super::document_collection::{repository_error, TypedCollection};
use crate::database::{DocumentStore, Filter, FindOptions, SortOrder};
use crate::errors::StoreError;

pub struct DocumentUserRepository {
    users: TypedCollection<User>,
}

impl DocumentUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: TypedCollection::new(store, "users"),
        }
    }
}

/// Unique index violations surface as the matching conflict.
fn map_write_error(err: StoreError, user: &User) -> DomainError {
    match &err {
        StoreError::DuplicateKey { index, .. } if index.starts_with("username") => {
            DomainError::UsernameAlreadyExists(user.username().to_string())
        }
        StoreError::DuplicateKey { index, .. } if index.starts_with("email") => {
            DomainError::EmailAlreadyExists(user.email().to_string())
        }
        _ => repository_error(err),
    }
}

#[async_trait]
impl UserRepository for DocumentUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        self.users.find_one(Filter::eq("_id", id)).await.map_err(repository_error)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.users
            .find_one(Filter::eq("username", username))
            .await
            .map_err(repository_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.users
            .find_one(Filter::eq("email", email))
            .await
            .map_err(repository_error)
    }

    async fn save(&self, user: &User) -> Result<User, DomainError> {
        self.users
            .insert(user)
            .await
            .map_err(|e| map_write_error(e, user))?;
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let found = self
            .users
            .replace(user.id(), user)
            .await
            .map_err(|e| map_write_error(e, user))?;
        if !found {
            return Err(DomainError::UserNotFound(user.id().to_string()));
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.users.delete(id).await.map_err(repository_error)?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        self.users
            .find_many(Filter::empty(), FindOptions::sorted_by("createdAt", SortOrder::Ascending))
            .await
            .map_err(repository_error)
    }
}
