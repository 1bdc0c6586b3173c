use infrastructure::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage setup failed: {0}")]
    Storage(#[from] StoreError),

    /// A migration run stopped early; `applied` lists what it did apply.
    #[error("{message}")]
    Migration { message: String, applied: Vec<String> },
}
