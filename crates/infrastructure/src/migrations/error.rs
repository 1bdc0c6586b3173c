use thiserror::Error;

use crate::errors::StoreError;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Migration version {0} not found")]
    NotFound(String),

    /// The database is in a state a unit cannot reconcile.
    #[error("{0}")]
    Consistency(String),

    #[error("Migration {version} failed: {source}")]
    Apply {
        version: String,
        #[source]
        source: Box<MigrationError>,
    },

    #[error("Failed to record migration {version}: {source}")]
    Persistence {
        version: String,
        #[source]
        source: StoreError,
    },

    #[error("Invalid migration registration: {0}")]
    Registration(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MigrationError {
    pub fn consistency(message: impl Into<String>) -> Self {
        MigrationError::Consistency(message.into())
    }
}
