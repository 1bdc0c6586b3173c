use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the migration ledger, written once when a unit is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub version: String,
    pub description: String,
    pub applied_at: DateTime<Utc>,
    pub migration_class: String,
}

impl MigrationRecord {
    pub fn new(version: &str, description: &str, migration_class: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            version: version.to_string(),
            description: description.to_string(),
            applied_at: Utc::now(),
            migration_class: migration_class.to_string(),
        }
    }
}
