use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::require_non_blank;
use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    #[serde(rename = "_id")]
    id: String,
    follower_id: String,
    followee_id: String,
    created_at: DateTime<Utc>,
}

impl Follow {
    pub fn new(
        id: impl Into<String>,
        follower_id: impl Into<String>,
        followee_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let follower_id = follower_id.into();
        let followee_id = followee_id.into();

        require_non_blank(&id, "Id")?;
        require_non_blank(&follower_id, "Follower ID")?;
        require_non_blank(&followee_id, "Followee ID")?;

        if follower_id.to_lowercase() == followee_id.to_lowercase() {
            return Err(DomainError::validation("User cannot follow themselves"));
        }

        Ok(Self {
            id,
            follower_id,
            followee_id,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn follower_id(&self) -> &str {
        &self.follower_id
    }

    pub fn followee_id(&self) -> &str {
        &self.followee_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
