use async_trait::async_trait;
use serde_json::Value;

use super::document::{
    document_id, CollectionOptions, Document, Filter, FindOptions, IndexModel, ID_FIELD,
};
use super::validator::validate_document;
use crate::errors::StoreError;

/// Handle onto a document database: string-named collections of JSON
/// documents keyed by a string `_id`.
///
/// Inserting into (or indexing) a collection that does not exist creates it,
/// and reads from a missing collection return nothing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;

    async fn create_collection(&self, name: &str, options: CollectionOptions) -> Result<(), StoreError>;

    /// Dropping a missing collection is not an error.
    async fn drop_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Creating an index that already exists with the same keys is a no-op.
    async fn create_index(&self, collection: &str, index: IndexModel) -> Result<(), StoreError>;

    async fn drop_index(&self, collection: &str, name: &str) -> Result<(), StoreError>;

    async fn list_indexes(&self, collection: &str) -> Result<Vec<IndexModel>, StoreError>;

    /// Returns the `_id` of the stored document, generating one when absent.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// Returns false when no document has the given id.
    async fn replace_one(&self, collection: &str, id: &str, document: Document) -> Result<bool, StoreError>;

    async fn delete_one(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let documents = self.find(collection, filter, &FindOptions::default()).await?;
        Ok(documents.len() as u64)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let options = FindOptions::default().with_limit(1);
        Ok(self.find(collection, filter, &options).await?.into_iter().next())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.list_collection_names().await?.iter().any(|n| n == name))
    }
}

/// Finds stored documents by exact field values on behalf of [`CollectionMeta`].
pub(crate) trait KeyLookup {
    /// Documents whose fields may equal `key`. Extra rows are allowed; callers
    /// compare the keys again.
    fn matching(&mut self, key: &[(String, Value)]) -> Result<Vec<Document>, StoreError>;
}

/// Lookup over documents already held in memory.
pub(crate) struct LoadedDocuments<'a>(pub &'a [Document]);

impl KeyLookup for LoadedDocuments<'_> {
    fn matching(&mut self, key: &[(String, Value)]) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .0
            .iter()
            .filter(|document| {
                key.iter()
                    .all(|(field, value)| document.get(field).unwrap_or(&Value::Null) == value)
            })
            .cloned()
            .collect())
    }
}

/// Per-collection settings shared by the store implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct CollectionMeta {
    pub validator: Option<Value>,
    pub indexes: Vec<IndexModel>,
}

impl CollectionMeta {
    /// Assigns an id when missing and checks the document against the
    /// validator, the `_id` and every unique index.
    pub fn prepare_insert(
        &self,
        collection: &str,
        mut document: Document,
        lookup: &mut dyn KeyLookup,
    ) -> Result<(String, Document), StoreError> {
        let id = match document.get(ID_FIELD) {
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            Some(_) => {
                return Err(StoreError::InvalidDocument(format!(
                    "{} must be a non-empty string",
                    ID_FIELD
                )))
            }
        };

        let same_id = lookup.matching(&[(ID_FIELD.to_string(), Value::String(id.clone()))])?;
        if same_id.iter().any(|other| document_id(other) == Some(id.as_str())) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                index: "_id_".to_string(),
            });
        }

        self.check(collection, &id, &document, lookup)?;
        Ok((id, document))
    }

    /// Checks a replacement; the stored `_id` always wins.
    pub fn prepare_replace(
        &self,
        collection: &str,
        id: &str,
        mut document: Document,
        lookup: &mut dyn KeyLookup,
    ) -> Result<Document, StoreError> {
        document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.check(collection, id, &document, lookup)?;
        Ok(document)
    }

    /// Adds an index, failing when `existing` documents already collide on it.
    /// Only documents that could share a key need to be passed.
    pub fn add_index(
        &mut self,
        collection: &str,
        index: IndexModel,
        existing: &[Document],
    ) -> Result<bool, StoreError> {
        if let Some(current) = self.indexes.iter().find(|i| i.name == index.name) {
            if current.same_spec(&index) {
                return Ok(false);
            }
            return Err(StoreError::IndexConflict {
                collection: collection.to_string(),
                index: index.name,
            });
        }

        if index.unique {
            let mut seen = Vec::with_capacity(existing.len());
            for document in existing {
                let key = index.key_of(document);
                if seen.contains(&key) {
                    return Err(StoreError::DuplicateKey {
                        collection: collection.to_string(),
                        index: index.name,
                    });
                }
                seen.push(key);
            }
        }

        self.indexes.push(index);
        Ok(true)
    }

    fn check(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        lookup: &mut dyn KeyLookup,
    ) -> Result<(), StoreError> {
        if let Some(validator) = &self.validator {
            validate_document(validator, document).map_err(|reason| StoreError::SchemaViolation {
                collection: collection.to_string(),
                reason,
            })?;
        }

        for index in self.indexes.iter().filter(|index| index.unique) {
            let key = index.key_of(document);
            let fields: Vec<(String, Value)> = index
                .keys
                .iter()
                .map(|(field, _)| field.clone())
                .zip(key.iter().cloned())
                .collect();

            let collides = lookup
                .matching(&fields)?
                .iter()
                .filter(|other| document_id(other) != Some(id))
                .any(|other| index.key_of(other) == key);
            if collides {
                return Err(StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    index: index.name.clone(),
                });
            }
        }

        Ok(())
    }
}
