// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed aggregation stages over a user's embedded exercise log.
//!
//! A pipeline starts from one user document, unwinds its log into one row
//! per entry, narrows and orders the rows, and groups them back under the
//! user id. Firestore has no server-side equivalent for arrays, so backends
//! fetch the document and call [`evaluate`].

use crate::db::StoreError;
use crate::models::{ExerciseEntry, UserRecord};
use chrono::NaiveDate;
use std::fmt;

/// Direction of the date sort. Log queries only ever list newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Descending,
}

/// One aggregation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Flatten the embedded log into one row per entry.
    Unwind,
    /// Keep rows dated on or after the bound.
    MatchGte(NaiveDate),
    /// Keep rows dated on or before the bound.
    MatchLte(NaiveDate),
    /// Keep at most this many rows.
    Limit(usize),
    /// Order rows by entry date. Rows with equal dates keep their order.
    Sort(SortOrder),
    /// Collect the remaining rows back under their user id.
    Group,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Unwind => write!(f, "unwind(log)"),
            Stage::MatchGte(date) => write!(f, "match(log.date >= {date})"),
            Stage::MatchLte(date) => write!(f, "match(log.date <= {date})"),
            Stage::Limit(n) => write!(f, "limit({n})"),
            Stage::Sort(SortOrder::Descending) => write!(f, "sort(log.date desc)"),
            Stage::Group => write!(f, "group(_id)"),
        }
    }
}

/// Output of the group stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedLog {
    pub user_id: String,
    pub entries: Vec<ExerciseEntry>,
}

enum State<'a> {
    Document(&'a UserRecord),
    Rows(Vec<&'a ExerciseEntry>),
    Grouped(Option<GroupedLog>),
}

/// Evaluate `stages` against a single user document.
///
/// The stage list must start with [`Stage::Unwind`] and end with
/// [`Stage::Group`]; row stages are only valid in between.
pub fn evaluate(user: &UserRecord, stages: &[Stage]) -> Result<Option<GroupedLog>, StoreError> {
    let mut state = State::Document(user);

    for (position, stage) in stages.iter().enumerate() {
        state = match (state, stage) {
            (State::Document(doc), Stage::Unwind) => {
                State::Rows(doc.log.iter().collect())
            }
            (State::Rows(mut rows), Stage::MatchGte(from)) => {
                rows.retain(|row| row.date >= *from);
                State::Rows(rows)
            }
            (State::Rows(mut rows), Stage::MatchLte(to)) => {
                rows.retain(|row| row.date <= *to);
                State::Rows(rows)
            }
            (State::Rows(mut rows), Stage::Limit(n)) => {
                rows.truncate(*n);
                State::Rows(rows)
            }
            (State::Rows(mut rows), Stage::Sort(SortOrder::Descending)) => {
                rows.sort_by(|a, b| b.date.cmp(&a.date));
                State::Rows(rows)
            }
            (State::Rows(rows), Stage::Group) => {
                if rows.is_empty() {
                    State::Grouped(None)
                } else {
                    State::Grouped(Some(GroupedLog {
                        user_id: user.id.clone(),
                        entries: rows.into_iter().cloned().collect(),
                    }))
                }
            }
            (_, stage) => {
                return Err(StoreError::Pipeline(format!(
                    "stage {position} ({stage}) is not valid here"
                )))
            }
        };
    }

    match state {
        State::Grouped(result) => Ok(result),
        _ => Err(StoreError::Pipeline(
            "pipeline must end with a group stage".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(description: &str, date: NaiveDate) -> ExerciseEntry {
        ExerciseEntry {
            description: description.to_string(),
            duration: 30,
            date,
        }
    }

    fn user_with_log() -> UserRecord {
        UserRecord {
            id: "user-1".to_string(),
            username: "ada".to_string(),
            log: vec![
                entry("jan", date(2023, 1, 1)),
                entry("feb", date(2023, 2, 1)),
                entry("mar", date(2023, 3, 1)),
            ],
        }
    }

    fn descriptions(log: &GroupedLog) -> Vec<&str> {
        log.entries.iter().map(|e| e.description.as_str()).collect()
    }

    #[test]
    fn test_date_window_keeps_only_matching_rows() {
        let stages = [
            Stage::Unwind,
            Stage::MatchGte(date(2023, 1, 15)),
            Stage::MatchLte(date(2023, 2, 15)),
            Stage::Sort(SortOrder::Descending),
            Stage::Group,
        ];

        let result = evaluate(&user_with_log(), &stages).unwrap().unwrap();
        assert_eq!(result.user_id, "user-1");
        assert_eq!(descriptions(&result), ["feb"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let stages = [
            Stage::Unwind,
            Stage::MatchGte(date(2023, 1, 1)),
            Stage::MatchLte(date(2023, 3, 1)),
            Stage::Sort(SortOrder::Descending),
            Stage::Group,
        ];

        let result = evaluate(&user_with_log(), &stages).unwrap().unwrap();
        assert_eq!(descriptions(&result), ["mar", "feb", "jan"]);
    }

    #[test]
    fn test_limit_before_sort_truncates_in_log_order() {
        let stages = [
            Stage::Unwind,
            Stage::Limit(2),
            Stage::Sort(SortOrder::Descending),
            Stage::Group,
        ];

        let result = evaluate(&user_with_log(), &stages).unwrap().unwrap();
        assert_eq!(descriptions(&result), ["feb", "jan"]);
    }

    #[test]
    fn test_limit_after_sort_keeps_most_recent() {
        let stages = [
            Stage::Unwind,
            Stage::Sort(SortOrder::Descending),
            Stage::Limit(2),
            Stage::Group,
        ];

        let result = evaluate(&user_with_log(), &stages).unwrap().unwrap();
        assert_eq!(descriptions(&result), ["mar", "feb"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut user = user_with_log();
        user.log.push(entry("feb-second", date(2023, 2, 1)));

        let stages = [Stage::Unwind, Stage::Sort(SortOrder::Descending), Stage::Group];
        let result = evaluate(&user, &stages).unwrap().unwrap();
        assert_eq!(descriptions(&result), ["mar", "feb", "feb-second", "jan"]);
    }

    #[test]
    fn test_no_surviving_rows_groups_to_none() {
        let stages = [Stage::Unwind, Stage::MatchGte(date(2024, 1, 1)), Stage::Group];
        assert_eq!(evaluate(&user_with_log(), &stages).unwrap(), None);

        let empty = UserRecord::new("user-2".to_string(), "bob".to_string());
        assert_eq!(evaluate(&empty, &[Stage::Unwind, Stage::Group]).unwrap(), None);
    }

    #[test]
    fn test_rejects_misordered_stages() {
        let err = evaluate(&user_with_log(), &[Stage::Limit(1), Stage::Group]).unwrap_err();
        assert!(matches!(err, StoreError::Pipeline(msg) if msg.contains("limit(1)")));

        let err = evaluate(&user_with_log(), &[Stage::Unwind]).unwrap_err();
        assert!(matches!(err, StoreError::Pipeline(_)));

        let err = evaluate(
            &user_with_log(),
            &[Stage::Unwind, Stage::Group, Stage::Unwind],
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Pipeline(_)));
    }
}
