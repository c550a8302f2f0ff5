use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

use crate::constants::snapshot::FRACTION_DIGITS;
use crate::errors::TimestampError;

const WHOLE_SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an ISO-8601 `...Z` timestamp with microsecond precision.
///
/// A fractional part is truncated or zero-padded to six digits, so `.5Z`,
/// `.500000Z` and `.500000001Z` are the same instant.
pub fn parse_created_at(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let body = value
        .trim()
        .strip_suffix('Z')
        .ok_or_else(|| TimestampError::new(value, "missing 'Z' UTC suffix"))?;

    let (whole, micros) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, fraction_to_micros(value, fraction)?),
        None => (body, 0),
    };

    let parsed = NaiveDateTime::parse_from_str(whole, WHOLE_SECOND_FORMAT)
        .map_err(|e| TimestampError::new(value, e.to_string()))?;

    parsed
        .with_nanosecond(micros * 1_000)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| TimestampError::new(value, "fractional seconds out of range"))
}

fn fraction_to_micros(value: &str, fraction: &str) -> Result<u32, TimestampError> {
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::new(value, "fractional seconds are not numeric"));
    }

    let mut digits: String = fraction.chars().take(FRACTION_DIGITS).collect();
    while digits.len() < FRACTION_DIGITS {
        digits.push('0');
    }

    digits
        .parse::<u32>()
        .map_err(|e| TimestampError::new(value, e.to_string()))
}
