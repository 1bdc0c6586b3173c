pub mod error;
pub mod ledger;
pub mod migration;
pub mod record;
pub mod registry;
pub mod result;
pub mod runner;
pub mod scripts;

pub use error::MigrationError;
pub use ledger::{MigrationLedger, MIGRATIONS_COLLECTION};
pub use migration::Migration;
pub use record::MigrationRecord;
pub use registry::MigrationRegistry;
pub use result::{MigrationResult, MigrationState, MigrationStatus};
pub use runner::MigrationRunner;
