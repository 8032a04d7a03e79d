use crate::duration::DurationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a `Start`/`Finish` cell into wall-clock calendar time.
///
/// Offsets in RFC 3339 input are discarded, not applied: the date and time
/// are taken exactly as written. A bare date means midnight.
pub fn parse_instant(input: &str) -> Result<NaiveDateTime, DurationError> {
    let trimmed = input.trim();

    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_local());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| DurationError::InvalidTimestamp {
            input: input.to_string(),
        })
}
