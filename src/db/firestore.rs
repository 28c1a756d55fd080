// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Each user is one document in `users`, with the exercise log embedded
//! as an array field.

use crate::db::{
    collections, new_user_id, parse_user_id, pipeline, ExerciseStore, GroupedLog, Stage,
    StoreError, StoreFuture,
};
use crate::models::{ExerciseEntry, UserRecord, UserSummary};
use futures_util::FutureExt;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // The emulator rejects real credentials, so skip the default token source.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// Id validation still runs; every call that needs the database fails
    /// with [`StoreError::Unavailable`].
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client.as_ref().ok_or_else(|| {
            StoreError::Unavailable("Database not connected (offline mode)".to_string())
        })
    }

    // ─── User Operations ─────────────────────────────────────────

    async fn fetch_user(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn write_user(&self, user: &UserRecord) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    /// Append inside a transaction so concurrent appends to the same user
    /// conflict instead of overwriting each other.
    /// The read must be bound to the transaction for the commit to detect
    /// a conflicting write.
    async fn append_atomic(
        &self,
        id: &str,
        entry: ExerciseEntry,
    ) -> Result<Option<UserRecord>, StoreError> {
        let client = self.get_client()?;

        let mut transaction = client.begin_transaction().await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to begin transaction: {}", e))
        })?;

        let reader = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let current: Option<UserRecord> = reader
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!("Failed to read user in transaction: {}", e))
            })?;

        let Some(mut user) = current else {
            let _ = transaction.rollback().await;
            return Ok(None);
        };

        user.log.push(entry);

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(&user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                StoreError::Unavailable(format!("Failed to add user to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = %user.id,
            log_len = user.log.len(),
            "Exercise appended"
        );

        Ok(Some(user))
    }
}

impl ExerciseStore for FirestoreDb {
    fn create_user<'a>(&'a self, username: &'a str) -> StoreFuture<'a, UserRecord> {
        async move {
            let user = UserRecord::new(new_user_id(), username.to_string());
            self.write_user(&user).await?;
            tracing::info!(user_id = %user.id, "User created");
            Ok(user)
        }
        .boxed()
    }

    fn list_users(&self) -> StoreFuture<'_, Vec<UserSummary>> {
        async move {
            // Unknown fields (the log) are ignored when deserializing summaries.
            self.get_client()?
                .fluent()
                .select()
                .from(collections::USERS)
                .order_by([("username", firestore::FirestoreQueryDirection::Ascending)])
                .obj::<UserSummary>()
                .query()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))
        }
        .boxed()
    }

    fn get_user<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, Option<UserRecord>> {
        async move {
            let id = parse_user_id(user_id)?;
            self.fetch_user(&id).await
        }
        .boxed()
    }

    fn append_entry<'a>(
        &'a self,
        user_id: &'a str,
        entry: ExerciseEntry,
    ) -> StoreFuture<'a, Option<UserRecord>> {
        async move {
            let id = parse_user_id(user_id)?;
            self.append_atomic(&id, entry).await
        }
        .boxed()
    }

    fn aggregate_log<'a>(
        &'a self,
        user_id: &'a str,
        stages: &'a [Stage],
    ) -> StoreFuture<'a, Option<GroupedLog>> {
        async move {
            let id = parse_user_id(user_id)?;
            let Some(user) = self.fetch_user(&id).await? else {
                return Ok(None);
            };

            tracing::debug!(
                user_id = %id,
                stages = stages.len(),
                log_len = user.log.len(),
                "Evaluating log pipeline"
            );

            pipeline::evaluate(&user, stages)
        }
        .boxed()
    }
}
