//! Common types used throughout Staybook

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Identifier type for every stored record
pub type Id = uuid::Uuid;

/// Parse a textual timestamp into UTC.
///
/// Accepts RFC 3339, plain calendar dates, and naive date-times separated by
/// `T` or a space (with or without fractional seconds). Naive values are read
/// as UTC. Returns `None` for anything else.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // Postgres renders offsets as `+00` or `+0000`
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a `YYYY-MM-DD` calendar date, also accepting a full timestamp and
/// keeping its date part.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if value.len() > 10 && value.contains(['T', ' ']) {
        return parse_timestamp(value).map(|dt| dt.date_naive());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.day(), 1);
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        assert!(parse_timestamp("2024-03-01 10:30:00").is_some());
        assert!(parse_timestamp("2024-03-01T10:30:00.123").is_some());
        let midnight = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn test_parse_postgres_offset() {
        let dt = parse_timestamp("2024-03-01 10:30:00.5+00").unwrap();
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_rejects_non_dates() {
        assert!(parse_timestamp("Paris").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("120").is_none());
        assert!(parse_calendar_date("not-a-date").is_none());
        assert!(parse_calendar_date("2024-03-01 garbage").is_none());
    }

    #[test]
    fn test_calendar_date() {
        let date = parse_calendar_date("2024-06-03").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 6, 3));
        let from_ts = parse_calendar_date("2024-06-03T00:00:00Z").unwrap();
        assert_eq!(from_ts, date);
    }
}
