pub mod database;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod security;

pub use database::*;
pub use errors::*;
pub use migrations::*;
pub use repositories::*;
pub use security::*;
