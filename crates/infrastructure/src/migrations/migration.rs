use async_trait::async_trait;

use super::error::MigrationError;
use crate::database::DocumentStore;

/// A versioned, reversible change to the document store.
///
/// Versions are compared as plain strings, so "010" sorts after "002" but
/// "10" sorts before "2". Keep them zero-padded to one width.
#[async_trait]
pub trait Migration: Send + Sync {
    fn version(&self) -> &str;

    fn description(&self) -> &str;

    /// Identifier stored in the ledger as `migrationClass`.
    fn name(&self) -> &str;

    async fn up(&self, store: &dyn DocumentStore) -> Result<(), MigrationError>;

    async fn down(&self, store: &dyn DocumentStore) -> Result<(), MigrationError>;
}
