use serde::Serialize;
use std::fmt;
use std::time::Duration;

use super::record::MigrationRecord;

/// Where a run stopped. Indices point into the ordered list of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Idle,
    Discovering,
    Comparing,
    Applying(usize),
    Recording(usize),
    Completed,
    Failed,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Idle => write!(f, "idle"),
            MigrationState::Discovering => write!(f, "discovering"),
            MigrationState::Comparing => write!(f, "comparing"),
            MigrationState::Applying(index) => write!(f, "applying #{}", index),
            MigrationState::Recording(index) => write!(f, "recording #{}", index),
            MigrationState::Completed => write!(f, "completed"),
            MigrationState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    pub success: bool,
    pub error_message: Option<String>,
    /// Versions applied by this run, in order.
    pub applied_migrations: Vec<String>,
    /// Versions that were already in the ledger.
    pub skipped_migrations: Vec<String>,
    pub duration: Duration,
    pub final_state: MigrationState,
}

impl MigrationResult {
    pub fn successful(applied: Vec<String>, skipped: Vec<String>, duration: Duration) -> Self {
        Self {
            success: true,
            error_message: None,
            applied_migrations: applied,
            skipped_migrations: skipped,
            duration,
            final_state: MigrationState::Completed,
        }
    }

    pub fn failed(
        error_message: impl Into<String>,
        applied: Vec<String>,
        skipped: Vec<String>,
        duration: Duration,
    ) -> Self {
        Self {
            success: false,
            error_message: Some(error_message.into()),
            applied_migrations: applied,
            skipped_migrations: skipped,
            duration,
            final_state: MigrationState::Failed,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.success && self.applied_migrations.is_empty() && self.skipped_migrations.is_empty()
    }
}

/// Snapshot of the ledger against the known units.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    pub current_version: Option<String>,
    pub applied: Vec<MigrationRecord>,
    pub pending: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }
}
