use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};

pub mod document;
pub mod memory_store;
pub mod schema;
pub mod sqlite_store;
pub mod store;
pub mod validator;

pub use document::*;
pub use memory_store::InMemoryDocumentStore;
pub use sqlite_store::SqliteDocumentStore;
pub use store::DocumentStore;

use crate::errors::StoreError;

pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database file and makes sure the store tables exist.
    pub fn new(database_path: &str) -> Result<Self, StoreError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_path);
        // A single connection serializes writers; every ":memory:" connection
        // would otherwise be its own database
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StoreError::Backend(format!("Failed to create SQLite connection pool: {}", e)))?;

        let mut conn = pool.get()?;
        for statement in schema::CREATE_TABLES {
            diesel::sql_query(*statement).execute(&mut conn)?;
        }

        Ok(Database { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }
}
