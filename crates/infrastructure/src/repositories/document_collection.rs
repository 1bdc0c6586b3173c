use std::marker::PhantomData;
use std::sync::Arc;

use domain::DomainError;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::{from_document, to_document, DocumentStore, Filter, FindOptions};
use crate::errors::StoreError;

pub(crate) fn repository_error(err: StoreError) -> DomainError {
    DomainError::RepositoryError(err.to_string())
}

/// A collection whose documents are serde representations of `T`.
pub(crate) struct TypedCollection<T> {
    store: Arc<dyn DocumentStore>,
    name: &'static str,
    _entity: PhantomData<fn() -> T>,
}

impl<T> TypedCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn DocumentStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            _entity: PhantomData,
        }
    }

    pub async fn find_one(&self, filter: Filter) -> Result<Option<T>, StoreError> {
        self.store
            .find_one(self.name, &filter)
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn find_many(&self, filter: Filter, options: FindOptions) -> Result<Vec<T>, StoreError> {
        self.store
            .find(self.name, &filter, &options)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn insert(&self, entity: &T) -> Result<(), StoreError> {
        self.store.insert_one(self.name, to_document(entity)?).await?;
        Ok(())
    }

    /// Returns false when nothing is stored under `id`.
    pub async fn replace(&self, id: &str, entity: &T) -> Result<bool, StoreError> {
        self.store.replace_one(self.name, id, to_document(entity)?).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete_one(self.name, id).await
    }
}
