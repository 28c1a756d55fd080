//! User model for storage and API.

use crate::models::ExerciseEntry;
use serde::{Deserialize, Serialize};

/// User document stored in Firestore, with its exercise log embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Store-assigned UUID (also used as document ID)
    pub id: String,
    /// Display name chosen at registration
    pub username: String,
    /// Logged exercises in append order
    #[serde(default)]
    pub log: Vec<ExerciseEntry>,
}

impl UserRecord {
    pub fn new(id: String, username: String) -> Self {
        Self {
            id,
            username,
            log: Vec::new(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
        }
    }
}

/// Projection of a user without its log, used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}
