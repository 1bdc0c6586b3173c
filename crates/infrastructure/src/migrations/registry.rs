use std::sync::Arc;

use tracing::warn;

use super::error::MigrationError;
use super::migration::Migration;
use super::scripts::{InitialSetup, PostTagIndexes};

/// Ordered manifest of every migration the application knows about.
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    migrations: Vec<Arc<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The migrations shipped with the application.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.migrations.push(Arc::new(InitialSetup));
        registry.migrations.push(Arc::new(PostTagIndexes));
        registry
    }

    pub fn register(&mut self, migration: Arc<dyn Migration>) -> Result<(), MigrationError> {
        let version = migration.version();
        if version.trim().is_empty() {
            return Err(MigrationError::Registration(format!(
                "{} has a blank version",
                migration.name()
            )));
        }

        if let Some(existing) = self.migrations.iter().find(|m| m.version() == version) {
            return Err(MigrationError::Registration(format!(
                "version {} is used by both {} and {}",
                version,
                existing.name(),
                migration.name()
            )));
        }

        if let Some(other) = self.migrations.iter().find(|m| m.version().len() != version.len()) {
            warn!(
                "Migration versions {} and {} differ in width; versions are ordered lexically",
                other.version(),
                version
            );
        }

        self.migrations.push(migration);
        Ok(())
    }

    pub fn with(mut self, migration: Arc<dyn Migration>) -> Result<Self, MigrationError> {
        self.register(migration)?;
        Ok(self)
    }

    /// Registered migrations sorted by version.
    pub fn ordered(&self) -> Vec<Arc<dyn Migration>> {
        let mut migrations = self.migrations.clone();
        migrations.sort_by(|a, b| a.version().cmp(b.version()));
        migrations
    }

    pub fn find(&self, version: &str) -> Option<Arc<dyn Migration>> {
        self.migrations.iter().find(|m| m.version() == version).cloned()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}
