use std::collections::BTreeSet;
use std::sync::Arc;

use super::record::MigrationRecord;
use crate::database::{from_document, to_document, DocumentStore, Filter, FindOptions, SortOrder};
use crate::errors::StoreError;

pub const MIGRATIONS_COLLECTION: &str = "migrations";

/// Append-only history of applied migrations kept in the `migrations` collection.
#[derive(Clone)]
pub struct MigrationLedger {
    store: Arc<dyn DocumentStore>,
}

impl MigrationLedger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, record: &MigrationRecord) -> Result<(), StoreError> {
        self.store
            .insert_one(MIGRATIONS_COLLECTION, to_document(record)?)
            .await?;
        Ok(())
    }

    pub async fn all(&self, order: SortOrder) -> Result<Vec<MigrationRecord>, StoreError> {
        let documents = self
            .store
            .find(
                MIGRATIONS_COLLECTION,
                &Filter::empty(),
                &FindOptions::sorted_by("version", order),
            )
            .await?;

        documents.into_iter().map(from_document).collect()
    }

    pub async fn contains(&self, version: &str) -> Result<bool, StoreError> {
        let count = self
            .store
            .count(MIGRATIONS_COLLECTION, &Filter::eq("version", version))
            .await?;
        Ok(count > 0)
    }

    pub async fn applied_versions(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self
            .all(SortOrder::Ascending)
            .await?
            .into_iter()
            .map(|record| record.version)
            .collect())
    }

    pub async fn latest(&self) -> Result<Option<MigrationRecord>, StoreError> {
        let options = FindOptions::sorted_by("version", SortOrder::Descending).with_limit(1);
        let document = self
            .store
            .find(MIGRATIONS_COLLECTION, &Filter::empty(), &options)
            .await?
            .into_iter()
            .next();

        document.map(from_document).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryDocumentStore;

    #[tokio::test]
    async fn latest_is_the_lexically_greatest_version() {
        let ledger = MigrationLedger::new(Arc::new(InMemoryDocumentStore::new()));
        assert!(ledger.latest().await.unwrap().is_none());

        for version in ["002", "010", "001"] {
            ledger
                .record(&MigrationRecord::new(version, "test", "Test"))
                .await
                .unwrap();
        }

        assert_eq!(ledger.latest().await.unwrap().unwrap().version, "010");
        assert!(ledger.contains("002").await.unwrap());
        assert!(!ledger.contains("003").await.unwrap());

        let descending: Vec<String> = ledger
            .all(SortOrder::Descending)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.version)
            .collect();
        assert_eq!(descending, vec!["010", "002", "001"]);
    }
}
