// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise-log retrieval with optional date-range and limit filters.
//!
//! Filters are validated before any store call. With no filters the user's
//! full log is returned as stored; otherwise a stage list is built by
//! [`build_pipeline`] and run through [`ExerciseStore::aggregate_log`].

use crate::db::{ExerciseStore, SortOrder, Stage};
use crate::error::{AppError, Result, LOG_UNAVAILABLE_MESSAGE};
use crate::models::ExerciseEntry;
use crate::time_utils::parse_iso_date;
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

/// Reported in place of entries when a filtered query matches nothing.
pub const NO_EXERCISES_MESSAGE: &str =
    "No exercises were found for this user with the given parameters.";

/// Where the `limit` stage sits relative to the date sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LimitPlacement {
    /// Truncate the unwound rows in log order, then sort.
    BeforeSort,
    /// Sort first, so `limit` keeps the most recent entries.
    #[default]
    AfterSort,
}

/// Raw query-string parameters of a log request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LogQueryParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<String>,
}

/// Validated filters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogFilters {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl LogFilters {
    /// Validate raw parameters. Blank values count as absent.
    pub fn parse(params: &LogQueryParams) -> Result<Self> {
        Ok(Self {
            from: parse_date_param("from", params.from.as_deref())?,
            to: parse_date_param("to", params.to.as_deref())?,
            limit: parse_limit(params.limit.as_deref())?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.limit.is_none()
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date_param(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    non_blank(raw)
        .map(|value| parse_iso_date(value).ok_or(AppError::InvalidDate { field }))
        .transpose()
}

fn parse_limit(raw: Option<&str>) -> Result<Option<usize>> {
    non_blank(raw)
        .map(|value| match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AppError::InvalidLimit),
        })
        .transpose()
}

/// Build the stage list for a filtered log query.
///
/// Order: unwind, `from` match, `to` match, then limit and the descending
/// date sort in the order chosen by `placement`, then group.
pub fn build_pipeline(filters: &LogFilters, placement: LimitPlacement) -> Vec<Stage> {
    let mut stages = vec![Stage::Unwind];

    if let Some(from) = filters.from {
        stages.push(Stage::MatchGte(from));
    }
    if let Some(to) = filters.to {
        stages.push(Stage::MatchLte(to));
    }

    let sort = Stage::Sort(SortOrder::Descending);
    match (filters.limit, placement) {
        (Some(n), LimitPlacement::BeforeSort) => stages.extend([Stage::Limit(n), sort]),
        (Some(n), LimitPlacement::AfterSort) => stages.extend([sort, Stage::Limit(n)]),
        (None, _) => stages.push(sort),
    }

    stages.push(Stage::Group);
    stages
}

/// Entries of a log result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntries {
    Found(Vec<ExerciseEntry>),
    /// A filtered query matched nothing; carries the reason shown to callers.
    Empty(String),
}

impl LogEntries {
    pub fn count(&self) -> usize {
        match self {
            LogEntries::Found(entries) => entries.len(),
            LogEntries::Empty(_) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogResult {
    pub user_id: String,
    pub username: String,
    pub entries: LogEntries,
}

/// Runs log queries against the injected store.
#[derive(Clone)]
pub struct LogQueryBuilder {
    store: Arc<dyn ExerciseStore>,
    placement: LimitPlacement,
}

impl LogQueryBuilder {
    pub fn new(store: Arc<dyn ExerciseStore>, placement: LimitPlacement) -> Self {
        Self { store, placement }
    }

    /// Validate `params`, query the store and map the outcome.
    pub async fn build_and_run(&self, user_id: &str, params: &LogQueryParams) -> Result<LogResult> {
        let filters = LogFilters::parse(params)?;
        self.run(user_id, &filters)
            .await
            .map_err(|e| e.with_unavailable_message(LOG_UNAVAILABLE_MESSAGE))
    }

    async fn run(&self, user_id: &str, filters: &LogFilters) -> Result<LogResult> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(user_id.to_string()))?;

        if filters.is_empty() {
            tracing::debug!(user_id = %user.id, count = user.log.len(), "Returning full log");
            return Ok(LogResult {
                user_id: user.id,
                username: user.username,
                entries: LogEntries::Found(user.log),
            });
        }

        let stages = build_pipeline(filters, self.placement);
        tracing::debug!(
            user_id = %user.id,
            from = ?filters.from,
            to = ?filters.to,
            limit = ?filters.limit,
            stages = %stages.iter().map(ToString::to_string).collect::<Vec<_>>().join(" | "),
            "Running filtered log query"
        );

        let grouped = self.store.aggregate_log(&user.id, &stages).await?;

        let entries = match grouped {
            Some(group) if !group.entries.is_empty() => LogEntries::Found(group.entries),
            _ => LogEntries::Empty(NO_EXERCISES_MESSAGE.to_string()),
        };

        Ok(LogResult {
            user_id: user.id,
            username: user.username,
            entries,
        })
    }
}
