// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Exercise entry model, embedded in a user's log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One logged exercise. Entries are appended to a user's log and never
/// edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub description: String,
    /// Duration in caller-defined units (usually minutes)
    pub duration: u32,
    /// Calendar date, serialized as `yyyy-mm-dd`
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_serializes_as_calendar_date() {
        let entry = ExerciseEntry {
            description: "Hill repeats".to_string(),
            duration: 45,
            date: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2023-02-01");
        assert_eq!(json["duration"], 45);
    }
}
