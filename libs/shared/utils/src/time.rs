use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}$").expect("valid date-time pattern"))
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}

/// `YYYY-MM-DDTHH:mm`, always UTC.
pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

pub fn matches_date_time_format(raw: &str) -> bool {
    date_time_regex().is_match(raw)
}

pub fn matches_date_format(raw: &str) -> bool {
    date_regex().is_match(raw)
}

/// Parses a minute-precision `YYYY-MM-DDTHH:mm` string as UTC.
///
/// Returns `None` for anything off-format or calendar-invalid (`2024-02-30T10:00`).
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    if !matches_date_time_format(raw) {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parses `YYYY-MM-DD` as midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if !matches_date_format(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_and_format_round_trip() {
        let parsed = parse_date_time("2025-03-10T09:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap());
        assert_eq!(format_date_time(&parsed), "2025-03-10T09:30");
    }

    #[test]
    fn test_rejects_off_format_values() {
        assert!(parse_date_time("2025-03-10 09:30").is_none());
        assert!(parse_date_time("2025-03-10T09:30:00").is_none());
        assert!(parse_date_time("2025-3-10T09:30").is_none());
        assert!(parse_date_time("2025-02-30T09:30").is_none());
        assert!(parse_date("2025-03-10T00:00").is_none());
    }

    #[test]
    fn test_parse_date_is_midnight_utc() {
        let parsed = parse_date("2025-03-10").unwrap();
        assert_eq!(format_date_time(&parsed), "2025-03-10T00:00");
    }
}
