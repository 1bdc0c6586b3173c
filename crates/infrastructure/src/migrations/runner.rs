use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info};

use super::error::MigrationError;
use super::ledger::MigrationLedger;
use super::record::MigrationRecord;
use super::registry::MigrationRegistry;
use super::result::{MigrationResult, MigrationState, MigrationStatus};
use crate::database::{DocumentStore, SortOrder};

/// Applies registered migrations that are missing from the ledger, in
/// version order, recording each one as soon as it succeeds.
///
/// A failure stops the run. Migrations recorded before it stay recorded and
/// nothing is rolled back; running again resumes from the first pending unit.
pub struct MigrationRunner {
    store: Arc<dyn DocumentStore>,
    registry: MigrationRegistry,
    ledger: MigrationLedger,
}

#[derive(Debug)]
struct Progress {
    state: MigrationState,
    applied: Vec<String>,
    skipped: Vec<String>,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: MigrationState::Idle,
            applied: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn advance(&mut self, next: MigrationState) {
        debug!("Migration runner: {} -> {}", self.state, next);
        self.state = next;
    }
}

impl MigrationRunner {
    pub fn new(store: Arc<dyn DocumentStore>, registry: MigrationRegistry) -> Self {
        let ledger = MigrationLedger::new(store.clone());
        Self {
            store,
            registry,
            ledger,
        }
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub async fn migrate_to_latest(&self) -> MigrationResult {
        info!("Starting migration to latest version");
        self.run(None).await
    }

    /// Applies pending migrations whose version sorts at or before `target`.
    pub async fn migrate_to_version(&self, target: &str) -> MigrationResult {
        info!("Starting migration to version {}", target);
        self.run(Some(target)).await
    }

    pub async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        Ok(self.ledger.all(SortOrder::Ascending).await?)
    }

    pub async fn get_pending_migrations(&self) -> Result<Vec<String>, MigrationError> {
        let applied = self.ledger.applied_versions().await?;
        Ok(self
            .registry
            .ordered()
            .iter()
            .map(|migration| migration.version().to_string())
            .filter(|version| !applied.contains(version))
            .collect())
    }

    pub async fn get_current_version(&self) -> Result<Option<String>, MigrationError> {
        Ok(self.ledger.latest().await?.map(|record| record.version))
    }

    pub async fn status(&self) -> Result<MigrationStatus, MigrationError> {
        let applied = self.get_applied_migrations().await?;
        let pending = self.get_pending_migrations().await?;
        let current_version = applied.last().map(|record| record.version.clone());

        Ok(MigrationStatus {
            current_version,
            applied,
            pending,
        })
    }

    async fn run(&self, target: Option<&str>) -> MigrationResult {
        let started = Instant::now();
        let mut progress = Progress::new();

        match self.execute(target, &mut progress).await {
            Ok(()) => {
                progress.advance(MigrationState::Completed);
                let duration = started.elapsed();
                info!(
                    "Migration completed successfully. Applied: {}, Skipped: {}, Duration: {}ms",
                    progress.applied.len(),
                    progress.skipped.len(),
                    duration.as_millis()
                );
                MigrationResult::successful(progress.applied, progress.skipped, duration)
            }
            Err(e) => {
                progress.advance(MigrationState::Failed);
                let duration = started.elapsed();
                error!(
                    "Migration failed after {}ms. Applied migrations: [{}]: {}",
                    duration.as_millis(),
                    progress.applied.join(", "),
                    e
                );
                MigrationResult::failed(e.to_string(), progress.applied, progress.skipped, duration)
            }
        }
    }

    async fn execute(&self, target: Option<&str>, progress: &mut Progress) -> Result<(), MigrationError> {
        progress.advance(MigrationState::Discovering);
        let mut migrations = self.registry.ordered();

        if let Some(target) = target {
            if self.registry.find(target).is_none() {
                return Err(MigrationError::NotFound(target.to_string()));
            }
            migrations.retain(|migration| migration.version() <= target);
        }

        progress.advance(MigrationState::Comparing);
        let applied = self.ledger.applied_versions().await?;
        info!(
            "Found {} available migrations, {} already applied",
            migrations.len(),
            applied.len()
        );

        for (index, migration) in migrations.iter().enumerate() {
            let version = migration.version();
            if applied.contains(version) {
                debug!(
                    "Skipping already applied migration {}: {}",
                    version,
                    migration.description()
                );
                progress.skipped.push(version.to_string());
                continue;
            }

            progress.advance(MigrationState::Applying(index));
            info!("Applying migration {}: {}", version, migration.description());
            migration
                .up(self.store.as_ref())
                .await
                .map_err(|source| MigrationError::Apply {
                    version: version.to_string(),
                    source: Box::new(source),
                })?;

            progress.advance(MigrationState::Recording(index));
            let record = MigrationRecord::new(version, migration.description(), migration.name());
            self.ledger
                .record(&record)
                .await
                .map_err(|source| MigrationError::Persistence {
                    version: version.to_string(),
                    source,
                })?;

            progress.applied.push(version.to_string());
            info!("Successfully applied migration {}", version);
        }

        Ok(())
    }
}
