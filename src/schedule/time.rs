//! Service-day clock times.
//!
//! Transit schedules write times after midnight as hours past 23 (`25:10:00`
//! is 01:10 the next calendar day but still the same service day), so the
//! parser keeps the hour unbounded and returns minutes past service-day
//! midnight.

use crate::error::SimError;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Parses `HH:MM:SS` into fractional minutes past service-day midnight.
///
/// # Errors
///
/// [`SimError::InvalidTime`] unless the text is three `:`-separated unsigned
/// integers with minutes and seconds below 60.
///
/// # Examples
///
/// ```
/// use ebus_blocks::schedule::time::parse_service_time;
///
/// assert_eq!(parse_service_time("06:30:30").unwrap(), 390.5);
/// assert_eq!(parse_service_time("25:00:00").unwrap(), 1500.0);
/// assert!(parse_service_time("6:75:00").is_err());
/// ```
pub fn parse_service_time(text: &str) -> Result<f64, SimError> {
    let invalid = || SimError::InvalidTime(text.to_string());
    let mut parts = text.trim().split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    let field = |p: &str| p.parse::<u32>().map_err(|_| invalid());
    let (h, m, s) = (field(h)?, field(m)?, field(s)?);
    if m >= 60 || s >= 60 {
        return Err(invalid());
    }
    Ok(f64::from(h) * 60.0 + f64::from(m) + f64::from(s) / 60.0)
}

/// Formats minutes past service-day midnight as `HH:MM:SS`, rounding to the second.
pub fn format_service_time(minutes: f64) -> String {
    let total = (minutes.max(0.0) * 60.0).round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_after_midnight_service() {
        assert_eq!(parse_service_time("24:00:00").unwrap(), 1440.0);
        assert_eq!(parse_service_time("26:15:00").unwrap(), 1575.0);
    }

    #[test]
    fn tolerates_surrounding_whitespace_and_short_hours() {
        assert_eq!(parse_service_time(" 7:05:00 ").unwrap(), 425.0);
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["", "12:00", "12:00:00:00", "ab:00:00", "12:60:00", "12:00:60", "-1:00:00"] {
            assert!(
                matches!(parse_service_time(bad), Err(SimError::InvalidTime(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn format_inverts_parse() {
        for text in ["00:00:00", "06:30:30", "25:59:59"] {
            let minutes = parse_service_time(text).unwrap();
            assert_eq!(format_service_time(minutes), text);
        }
    }
}
