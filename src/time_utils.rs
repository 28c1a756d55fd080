// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar date parsing and formatting.

use chrono::{NaiveDate, Utc};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a strict `yyyy-mm-dd` calendar date.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // chrono accepts signs and space-padded fields; only take `dddd-dd-dd`.
    let canonical = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !canonical {
        return None;
    }
    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT).ok()
}

/// Today's date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Human-readable date, e.g. `Wed Feb 01 2023`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2023-01-15"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert_eq!(parse_iso_date("2023-1-15"), None);
        assert_eq!(parse_iso_date("2023- 1-15"), None);
        assert_eq!(parse_iso_date("2023-01- 5"), None);
        assert_eq!(parse_iso_date("+2023-1-15"), None);
        assert_eq!(parse_iso_date("02023-1-15"), None);
        assert_eq!(parse_iso_date("2023/01/15"), None);
        assert_eq!(parse_iso_date("2023-02-30"), None);
        assert_eq!(parse_iso_date("15/01/2023"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn test_format_display_date() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        assert_eq!(format_display_date(date), "Wed Feb 01 2023");
    }
}
