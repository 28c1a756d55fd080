// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise Tracker: a small REST API for logging exercises.
//!
//! Users register once, append exercise entries to their log, and query
//! the log with optional date-range and limit filters.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use anyhow::Context;
use config::{Config, StoreBackend};
use db::{ExerciseStore, FirestoreDb, InMemoryStore};
use services::LogQueryBuilder;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ExerciseStore>,
    pub log_query: LogQueryBuilder,
}

impl AppState {
    /// Build state around an already-initialised store.
    pub fn new(config: Config, store: Arc<dyn ExerciseStore>) -> Self {
        let log_query = LogQueryBuilder::new(store.clone(), config.limit_placement);
        Self {
            config,
            store,
            log_query,
        }
    }
}

/// Connect the store selected by `config`.
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn ExerciseStore>> {
    match config.store_backend {
        StoreBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id)
                .await
                .with_context(|| format!("Firestore project {}", config.gcp_project_id))?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
