// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format an activity date the way the activity log shows it, e.g. `5 Mar 2024`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_date_has_no_leading_zero() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_display_date(date), "5 Mar 2024");
        let date = NaiveDate::from_ymd_opt(2023, 11, 28).unwrap();
        assert_eq!(format_display_date(date), "28 Nov 2023");
    }

    #[test]
    fn test_rfc3339_uses_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(ts), "2024-03-05T10:30:00Z");
    }
}
