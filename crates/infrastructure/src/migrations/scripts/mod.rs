mod m001_initial_setup;
mod m002_post_tag_indexes;

pub use m001_initial_setup::InitialSetup;
pub use m002_post_tag_indexes::PostTagIndexes;

use tracing::debug;

use crate::database::{DocumentStore, IndexModel};
use crate::errors::StoreError;
use crate::migrations::MigrationError;

/// Creates an index, tolerating one that already exists under the same name.
async fn create_index_safely(
    store: &dyn DocumentStore,
    collection: &str,
    index: IndexModel,
) -> Result<(), MigrationError> {
    match store.create_index(collection, index).await {
        Ok(()) => Ok(()),
        Err(StoreError::IndexConflict { index, .. }) => {
            debug!("Index {} on {} already exists with other options, leaving it", index, collection);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
