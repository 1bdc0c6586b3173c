use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::document::{apply_find, document_id, CollectionOptions, Document, Filter, FindOptions, IndexModel};
use super::store::{CollectionMeta, DocumentStore, LoadedDocuments};
use crate::errors::StoreError;

#[derive(Debug, Default)]
struct MemoryCollection {
    meta: CollectionMeta,
    // Insertion order is the natural order
    documents: Vec<Document>,
}

/// Process-local store used by tests and the `memory` storage backend.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<BTreeMap<String, MemoryCollection>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }

    async fn create_collection(&self, name: &str, options: CollectionOptions) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(StoreError::CollectionExists(name.to_string()));
        }

        let collection = MemoryCollection {
            meta: CollectionMeta {
                validator: options.validator,
                indexes: Vec::new(),
            },
            documents: Vec::new(),
        };
        collections.insert(name.to_string(), collection);
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn create_index(&self, collection: &str, index: IndexModel) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        entry.meta.add_index(collection, index, &entry.documents)?;
        Ok(())
    }

    async fn drop_index(&self, collection: &str, name: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionNotFound(collection.to_string()))?;
        entry.meta.indexes.retain(|index| index.name != name);
        Ok(())
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<IndexModel>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|entry| entry.meta.indexes.clone())
            .unwrap_or_default())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        let mut collections = self.collections.write().await;
        let entry = collections.entry(collection.to_string()).or_default();
        let (id, document) = entry
            .meta
            .prepare_insert(collection, document, &mut LoadedDocuments(&entry.documents))?;
        entry.documents.push(document);
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .map(|entry| entry.documents.clone())
            .unwrap_or_default();
        Ok(apply_find(documents, filter, options))
    }

    async fn replace_one(&self, collection: &str, id: &str, document: Document) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let entry = match collections.get_mut(collection) {
            Some(entry) => entry,
            None => return Ok(false),
        };

        let position = match entry.documents.iter().position(|d| document_id(d) == Some(id)) {
            Some(position) => position,
            None => return Ok(false),
        };

        let document = entry
            .meta
            .prepare_replace(collection, id, document, &mut LoadedDocuments(&entry.documents))?;
        entry.documents[position] = document;
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let entry = match collections.get_mut(collection) {
            Some(entry) => entry,
            None => return Ok(false),
        };

        let before = entry.documents.len();
        entry.documents.retain(|d| document_id(d) != Some(id));
        Ok(entry.documents.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_creates_collection_and_assigns_id() {
        let store = InMemoryDocumentStore::new();
        let id = store.insert_one("notes", doc(json!({"text": "hi"}))).await.unwrap();

        assert_eq!(store.list_collection_names().await.unwrap(), vec!["notes"]);
        let found = store.find_one("notes", &Filter::eq("_id", id.as_str())).await.unwrap();
        assert_eq!(found.unwrap()["text"], "hi");
    }

    #[tokio::test]
    async fn create_collection_twice_fails() {
        let store = InMemoryDocumentStore::new();
        store.create_collection("users", CollectionOptions::default()).await.unwrap();
        assert!(matches!(
            store.create_collection("users", CollectionOptions::default()).await,
            Err(StoreError::CollectionExists(_))
        ));
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicates() {
        let store = InMemoryDocumentStore::new();
        store
            .create_index("users", IndexModel::ascending("email").unique())
            .await
            .unwrap();
        // Same spec again is a no-op
        store
            .create_index("users", IndexModel::ascending("email").unique())
            .await
            .unwrap();

        store.insert_one("users", doc(json!({"_id": "u1", "email": "a@b.io"}))).await.unwrap();
        let err = store
            .insert_one("users", doc(json!({"_id": "u2", "email": "a@b.io"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.count("users", &Filter::empty()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn conflicting_index_spec_is_rejected() {
        let store = InMemoryDocumentStore::new();
        store.create_index("users", IndexModel::ascending("email")).await.unwrap();
        assert!(matches!(
            store.create_index("users", IndexModel::ascending("email").unique()).await,
            Err(StoreError::IndexConflict { .. })
        ));
    }

    #[tokio::test]
    async fn validator_guards_inserts_and_replacements() {
        let store = InMemoryDocumentStore::new();
        let validator = json!({"$jsonSchema": {"required": ["name"]}});
        store
            .create_collection("things", CollectionOptions::with_validator(validator))
            .await
            .unwrap();

        assert!(matches!(
            store.insert_one("things", doc(json!({"_id": "t1"}))).await,
            Err(StoreError::SchemaViolation { .. })
        ));

        store.insert_one("things", doc(json!({"_id": "t1", "name": "a"}))).await.unwrap();
        assert!(store
            .replace_one("things", "t1", doc(json!({"name": "b"})))
            .await
            .unwrap());
        assert!(store.replace_one("things", "t1", doc(json!({}))).await.is_err());
        assert!(!store
            .replace_one("things", "missing", doc(json!({"name": "c"})))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delete_and_drop() {
        let store = InMemoryDocumentStore::new();
        store.insert_one("notes", doc(json!({"_id": "n1"}))).await.unwrap();

        assert!(store.delete_one("notes", "n1").await.unwrap());
        assert!(!store.delete_one("notes", "n1").await.unwrap());

        store.drop_collection("notes").await.unwrap();
        store.drop_collection("notes").await.unwrap();
        assert!(!store.collection_exists("notes").await.unwrap());
    }
}
