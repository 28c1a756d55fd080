// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local store for development and tests.
//!
//! Implements [`ExerciseStore`] with the same id rules as Firestore so the
//! API behaves identically against either backend.

use crate::db::{
    new_user_id, parse_user_id, pipeline, ExerciseStore, GroupedLog, Stage, StoreFuture,
};
use crate::models::{ExerciseEntry, UserRecord, UserSummary};
use dashmap::DashMap;
use futures_util::FutureExt;

/// In-memory user store keyed by user id.
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<String, UserRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user, replacing any existing user with the same id.
    pub fn insert_user(&self, user: UserRecord) {
        self.users.insert(user.id.clone(), user);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl ExerciseStore for InMemoryStore {
    fn create_user<'a>(&'a self, username: &'a str) -> StoreFuture<'a, UserRecord> {
        async move {
            let user = UserRecord::new(new_user_id(), username.to_string());
            self.users.insert(user.id.clone(), user.clone());
            tracing::debug!(user_id = %user.id, "User created (memory)");
            Ok(user)
        }
        .boxed()
    }

    fn list_users(&self) -> StoreFuture<'_, Vec<UserSummary>> {
        async move {
            let mut users: Vec<UserSummary> =
                self.users.iter().map(|entry| entry.value().summary()).collect();
            users.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.cmp(&b.id)));
            Ok(users)
        }
        .boxed()
    }

    fn get_user<'a>(&'a self, user_id: &'a str) -> StoreFuture<'a, Option<UserRecord>> {
        async move {
            let id = parse_user_id(user_id)?;
            Ok(self.users.get(&id).map(|user| user.value().clone()))
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
            // The shard write lock serialises appends for the same user.
            Ok(self.users.get_mut(&id).map(|mut user| {
                user.log.push(entry);
                user.value().clone()
            }))
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
            let Some(user) = self.users.get(&id).map(|user| user.value().clone()) else {
                return Ok(None);
            };
            pipeline::evaluate(&user, stages)
        }
        .boxed()
    }
}
