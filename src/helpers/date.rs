//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date-and-time layouts accepted in front matter, tried in order
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Date-only layouts accepted in front matter
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y"];

/// Parse a front-matter date string in various formats.
///
/// Values without an offset are read as UTC, which is what a browser does
/// with a bare ISO date. Returns `None` for empty or unrecognised input.
pub fn parse_date_string(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 3339 / ISO 8601 with offset, as written by the CMS date picker
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    // Year-only and year-month ISO dates start on the first day
    let padded = match s.len() {
        4 => format!("{}-01-01", s),
        7 => format!("{}-01", s),
        _ => return None,
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Format a date the way the site shows it (like "January 5, 2024")
pub fn full_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Format a raw front-matter date for display; empty when it does not parse
pub fn display_date(raw: &str) -> String {
    parse_date_string(raw)
        .map(|d| full_date(&d))
        .unwrap_or_default()
}

/// Format a date in ISO 8601 / XML format, for `<time datetime>` attributes
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_iso_date() {
        let dt = parse_date_string("2024-01-15").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 15));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_cms_datetime() {
        let dt = parse_date_string("2024-06-01T07:00:00.000Z").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-06-01 07:00");

        let dt = parse_date_string("2024-06-01T07:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 5);
    }

    #[test]
    fn test_parse_datetime_without_offset() {
        let dt = parse_date_string("2024-01-15 10:30:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        let dt = parse_date_string("2024/03/02").unwrap();
        assert_eq!(dt.month(), 3);
    }

    #[test]
    fn test_parse_partial_iso_dates() {
        let dt = parse_date_string("2025").unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2025-01-01");

        let dt = parse_date_string("2024-06").unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-06-01");

        assert!(parse_date_string("2024-13").is_none());
        assert!(parse_date_string("soon").is_none());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_date_string("").is_none());
        assert!(parse_date_string("   ").is_none());
        assert!(parse_date_string("not a date").is_none());
        assert!(parse_date_string("2024-13-45").is_none());
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-01-05"), "January 5, 2024");
        assert_eq!(display_date("2023-11-30T12:00:00Z"), "November 30, 2023");
        assert_eq!(display_date("someday"), "");
    }

    #[test]
    fn test_date_xml() {
        let dt = parse_date_string("2024-01-05").unwrap();
        assert_eq!(date_xml(&dt), "2024-01-05T00:00:00.000Z");
    }
}
