use config::{Config, StorageBackend};
use domain::*;
use infrastructure::*;
use std::sync::Arc;
use tracing::info;

pub mod error;
pub mod migration_commands;

pub use error::AppError;
pub use migration_commands::{run_migration_command, MigrateCommand};

/// MiniSocial application - wires the store, repositories, services and migrations
pub struct SocialApp {
    pub user_service: UserService,
    pub post_service: PostService,
    pub follow_service: FollowService,
    pub migration_runner: MigrationRunner,
}

impl SocialApp {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        // Infrastructure layer - document store setup
        let store: Arc<dyn DocumentStore> = match config.storage_backend {
            StorageBackend::Sqlite => {
                info!("💾 Using SQLite document store at {}", config.database_path);
                let database = Database::new(&config.database_path)?;
                Arc::new(SqliteDocumentStore::new(database.get_pool().clone()))
            }
            StorageBackend::Memory => {
                info!("🧠 Using in-memory document store");
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(store, MigrationRegistry::with_defaults()))
    }

    /// Fresh in-memory application with the default migrations registered.
    pub fn in_memory() -> Self {
        Self::with_store(
            Arc::new(InMemoryDocumentStore::new()),
            MigrationRegistry::with_defaults(),
        )
    }

    pub fn with_store(store: Arc<dyn DocumentStore>, registry: MigrationRegistry) -> Self {
        // Create repository implementations
        let user_repository: Arc<dyn UserRepository> =
            Arc::new(DocumentUserRepository::new(store.clone()));
        let post_repository: Arc<dyn PostRepository> =
            Arc::new(DocumentPostRepository::new(store.clone()));
        let comment_repository: Arc<dyn CommentRepository> =
            Arc::new(DocumentCommentRepository::new(store.clone()));
        let follow_repository: Arc<dyn FollowRepository> =
            Arc::new(DocumentFollowRepository::new(store.clone()));
        let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Sha256PasswordHasher::new());

        // Domain services
        let user_service = UserService::new(user_repository.clone(), password_hasher);
        let post_service = PostService::new(post_repository, comment_repository, user_repository.clone());
        let follow_service = FollowService::new(follow_repository, user_repository);

        let migration_runner = MigrationRunner::new(store, registry);

        Self {
            user_service,
            post_service,
            follow_service,
            migration_runner,
        }
    }

    /// Applies pending migrations, turning a failed run into an error.
    pub async fn migrate(&self) -> Result<MigrationResult, AppError> {
        let result = self.migration_runner.migrate_to_latest().await;
        if result.success {
            return Ok(result);
        }

        Err(AppError::Migration {
            message: result
                .error_message
                .unwrap_or_else(|| "Migration failed".to_string()),
            applied: result.applied_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_run_becomes_a_migration_error() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        // Half-initialized database that the first migration refuses to touch
        store
            .create_collection("users", CollectionOptions::default())
            .await
            .unwrap();

        let app = SocialApp::with_store(store, MigrationRegistry::with_defaults());
        match app.migrate().await {
            Err(AppError::Migration { message, applied }) => {
                assert!(message.contains("001"), "unexpected message: {}", message);
                assert!(applied.is_empty());
            }
            other => panic!("expected a migration error, got {:?}", other.map(|r| r.applied_migrations)),
        }
    }

    #[tokio::test]
    async fn successful_run_reports_applied_versions() {
        let app = SocialApp::in_memory();
        let result = app.migrate().await.unwrap();
        assert_eq!(result.applied_migrations, vec!["001", "002"]);
    }
}
