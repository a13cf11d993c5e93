//! Timestamp helpers.
//!
//! All database writes are RFC-3339 UTC strings with millisecond precision and
//! a `Z` suffix, so that string order in SQL equals chronological order.
//!
//! Examples
//! - "2024-03-10T09:30:00-05:00" -> "2024-03-10T14:30:00.000Z"

use chrono::{DateTime, SecondsFormat, Utc};

/// RFC-3339 with offset -> UTC.
///
/// Example:
/// - "2024-03-10T09:30:00-05:00" -> "2024-03-10T14:30:00Z"
pub fn parse_ts_to_utc(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let dt = DateTime::parse_from_rfc3339(s)?;
    Ok(dt.with_timezone(&Utc))
}

/// Formats a UTC instant the way it is stored: `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn to_rfc3339_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn offset_is_normalized_to_utc() {
        let dt = parse_ts_to_utc("2024-03-10T09:30:00-05:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 0).unwrap());
    }

    #[test]
    fn stored_format_is_fixed_width() {
        let a = to_rfc3339_millis(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(a, "2024-01-02T03:04:05.000Z");

        let base = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let later = base + chrono::Duration::milliseconds(7);
        let b = to_rfc3339_millis(later);
        assert_eq!(b, "2024-01-02T03:04:05.007Z");
        assert!(a < b);
    }

    #[test]
    fn round_trips_through_storage_format() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap();
        assert_eq!(parse_ts_to_utc(&to_rfc3339_millis(dt)).unwrap(), dt);
    }
}
