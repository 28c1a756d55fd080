// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise API routes: user registration, exercise logging and log queries.

use crate::error::{AppError, Result};
use crate::models::ExerciseEntry;
use crate::services::{LogEntries, LogQueryParams};
use crate::time_utils::{format_display_date, parse_iso_date, today_utc};
use crate::AppState;
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercise/new-user", post(create_user))
        .route("/api/exercise/add", post(add_exercise))
        .route("/api/exercise/users", get(list_users))
        .route("/api/exercise/log/{user_id}", get(get_log))
}

// ─── Users ───────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct NewUserForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Username must be 1-64 characters."))]
    username: String,
}

#[derive(Serialize)]
pub struct NewUserResponse {
    pub username: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Register a new user.
async fn create_user(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<NewUserForm>, FormRejection>,
) -> Result<Json<NewUserResponse>> {
    let Form(mut form) = form?;
    form.username = form.username.trim().to_string();
    form.validate()?;

    let user = state.store.create_user(&form.username).await?;

    Ok(Json(NewUserResponse {
        username: user.username,
        id: user.id,
    }))
}

#[derive(Serialize)]
pub struct UserListItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserListItem>,
}

/// List all users without their logs.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<UsersResponse>> {
    let users = state
        .store
        .list_users()
        .await?
        .into_iter()
        .map(|u| UserListItem {
            id: u.id,
            username: u.username,
        })
        .collect();

    Ok(Json(UsersResponse { users }))
}

// ─── Exercises ───────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct AddExerciseForm {
    #[serde(rename = "userId", default)]
    user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "Description must be 1-256 characters."))]
    description: String,
    #[serde(default)]
    duration: String,
    /// Optional `yyyy-mm-dd`; today (UTC) when blank or missing
    #[serde(default)]
    date: Option<String>,
}

#[derive(Serialize)]
pub struct AddExerciseResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    /// Rendered like `Wed Feb 01 2023`
    pub date: String,
    pub duration: u32,
    pub description: String,
}

/// Append an exercise to a user's log.
async fn add_exercise(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<AddExerciseForm>, FormRejection>,
) -> Result<Json<AddExerciseResponse>> {
    let Form(mut form) = form?;
    form.description = form.description.trim().to_string();
    form.validate()?;

    let duration = form.duration.trim().parse::<u32>().map_err(|_| {
        AppError::BadRequest("Duration must be a whole number.".to_string())
    })?;

    let date = match form.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_iso_date(raw).ok_or_else(|| {
            AppError::BadRequest("Date must use correct yyyy-mm-dd format.".to_string())
        })?,
        None => today_utc(),
    };

    let entry = ExerciseEntry {
        description: form.description,
        duration,
        date,
    };

    let user = state
        .store
        .append_entry(&form.user_id, entry.clone())
        .await?
        .ok_or_else(|| AppError::NotFound(form.user_id.clone()))?;

    tracing::debug!(user_id = %user.id, %date, duration, "Exercise added");

    Ok(Json(AddExerciseResponse {
        id: user.id,
        username: user.username,
        date: format_display_date(entry.date),
        duration: entry.duration,
        description: entry.description,
    }))
}

// ─── Log ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LogResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
    pub count: usize,
    pub log: Vec<ExerciseEntry>,
    /// Set when a filtered query matched nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Get a user's exercise log, optionally filtered by `from`, `to` and `limit`.
async fn get_log(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    query: std::result::Result<Query<LogQueryParams>, QueryRejection>,
) -> Result<Json<LogResponse>> {
    let Query(params) = query?;
    let result = state.log_query.build_and_run(&user_id, &params).await?;
    let count = result.entries.count();

    let (log, message) = match result.entries {
        LogEntries::Found(entries) => (entries, None),
        LogEntries::Empty(reason) => (Vec::new(), Some(reason)),
    };

    Ok(Json(LogResponse {
        user_id: result.user_id,
        username: result.username,
        count,
        log,
        message,
    }))
}
