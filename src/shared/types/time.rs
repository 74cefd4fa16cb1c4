//! Timestamp parsing and formatting for the JSON API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::errors::DomainError;

/// Parse a client-supplied ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2030-01-01T00:00:00Z`, with or without fractional
/// seconds or offset), a naive date-time taken as UTC and a bare date taken
/// as midnight UTC.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, DomainError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(DomainError::Validation(format!(
        "expiresAt: '{}' is not a valid ISO-8601 timestamp",
        input
    )))
}

/// Format a timestamp the way browsers print `Date.toISOString()`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2030-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_browser_iso_string() {
        let ts = parse_timestamp("2030-06-15T12:30:00.000Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2030, 6, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn naive_datetime_is_utc() {
        let ts = parse_timestamp("2030-06-15T12:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2030, 6, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let ts = parse_timestamp("2030-06-15").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2030, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_a_validation_error() {
        let err = parse_timestamp("next tuesday").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn formats_with_millis_and_z() {
        let ts = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "2030-01-01T00:00:00.000Z");
    }
}
