//! Database layer.
//!
//! Handlers and services reach the document store only through the
//! [`ExerciseStore`] trait. `firestore.rs` is the production backend,
//! `memory.rs` a process-local one for development and tests.

pub mod firestore;
pub mod memory;
pub mod pipeline;

pub use firestore::FirestoreDb;
pub use memory::InMemoryStore;
pub use pipeline::{GroupedLog, SortOrder, Stage};

use crate::models::{ExerciseEntry, UserRecord, UserSummary};
use futures_util::future::BoxFuture;
use uuid::Uuid;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

/// Store-level failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The id is not in the store's identifier format.
    #[error("Malformed document id: {0}")]
    InvalidId(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The stage list could not be evaluated.
    #[error("Invalid pipeline: {0}")]
    Pipeline(String),
}

pub type StoreFuture<'a, T> = BoxFuture<'a, Result<T, StoreError>>;

/// Document-store operations used by the API.
///
/// Object-safe so it can live behind `Arc<dyn ExerciseStore>` in
/// [`crate::AppState`]. Lookups return `Ok(None)` for a well-formed id
/// that matches no user; a malformed id is [`StoreError::InvalidId`].
pub trait ExerciseStore: Send + Sync {
    /// Register a new user and return it with its assigned id.
    fn create_user<'a>(&'a self, username: &'a str) -> StoreFuture<'a, UserRecord>;

    /// All users, without their logs.
    fn list_users(&self) -> StoreFuture<'_, Vec<UserSummary>>;

    /// Point lookup by id.
    fn get_user<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, Option<UserRecord>>;

    /// Append an entry to a user's log, returning the updated user.
    fn append_entry<'a>(
        &'a self,
        user_id: &'a str,
        entry: ExerciseEntry,
    ) -> StoreFuture<'a, Option<UserRecord>>;

    /// Run an ordered stage list over one user's log.
    ///
    /// `Ok(None)` when the user does not exist or no rows reach the group stage.
    fn aggregate_log<'a>(
        &'a self,
        user_id: &'a str,
        stages: &'a [Stage],
    ) -> StoreFuture<'a, Option<GroupedLog>>;
}

/// Generate a fresh user id.
pub fn new_user_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validate that `user_id` is in the store's id format and return its
/// canonical form.
pub fn parse_user_id(user_id: &str) -> Result<String, StoreError> {
    Uuid::parse_str(user_id.trim())
        .map(|id| id.to_string())
        .map_err(|_| StoreError::InvalidId(user_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id_canonicalizes() {
        let id = new_user_id();
        assert_eq!(parse_user_id(&id.to_uppercase()).unwrap(), id);
    }

    #[test]
    fn test_parse_user_id_rejects_malformed() {
        let err = parse_user_id("5f1b2c3d").unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(id) if id == "5f1b2c3d"));
    }
}
