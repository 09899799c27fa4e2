//! Quote timestamp conversion

use chrono::{DateTime, Local, Utc};

use crate::error::{ParseError, ParseResult};

/// Format used for human-readable quote timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Time zone used when rendering quote timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampZone {
    /// Coordinated Universal Time (default)
    #[default]
    Utc,
    /// The host's local time zone
    Local,
}

/// Parse a millisecond epoch timestamp sent as text
pub fn parse_timestamp_millis(value: &str) -> ParseResult<i64> {
    value.parse::<i64>().map_err(|_| ParseError::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Render a millisecond epoch timestamp as `YYYY-MM-DD HH:MM:SS.mmm`
pub fn format_timestamp_millis(millis: i64, zone: TimestampZone) -> ParseResult<String> {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or(ParseError::TimestampOutOfRange { millis })?;

    let formatted = match zone {
        TimestampZone::Utc => utc.format(TIMESTAMP_FORMAT).to_string(),
        TimestampZone::Local => utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string(),
    };
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_utc() {
        let formatted = format_timestamp_millis(1_700_000_000_123, TimestampZone::Utc).unwrap();
        assert_eq!(formatted, "2023-11-14 22:13:20.123");
    }

    #[test]
    fn test_millis_component_survives() {
        for millis in [0_i64, 1, 999, 1_700_000_000_000, 1_700_000_000_007, 1_731_000_123_456] {
            for zone in [TimestampZone::Utc, TimestampZone::Local] {
                let formatted = format_timestamp_millis(millis, zone).unwrap();
                let (_, fraction) = formatted.rsplit_once('.').unwrap();
                assert_eq!(fraction.len(), 3);
                assert_eq!(fraction.parse::<i64>().unwrap(), millis.rem_euclid(1000));
            }
        }
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp_millis("1700000000123").unwrap(), 1_700_000_000_123);
        assert!(parse_timestamp_millis("").is_err());
        assert!(parse_timestamp_millis("17e11").is_err());
        assert!(parse_timestamp_millis(" 1700000000123").is_err());
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            format_timestamp_millis(i64::MAX, TimestampZone::Utc),
            Err(ParseError::TimestampOutOfRange { .. })
        ));
    }
}
