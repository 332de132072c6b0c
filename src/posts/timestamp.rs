// Timestamp validation — `createdAt` text to calendar month.
//
// The API sends epoch milliseconds, usually as a string. Only plain integers
// are accepted: text like "1610000000000.0" and blanks are errors rather
// than a silently wrong month. Integers that do not fit in i64 or that
// chrono cannot represent are out of range.

use std::num::IntErrorKind;

use chrono::{DateTime, Datelike, FixedOffset};

use crate::error::TimestampError;

/// Parse a `createdAt` value into epoch milliseconds.
pub fn parse_epoch_millis(raw: &str) -> Result<i64, TimestampError> {
    raw.trim().parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => TimestampError::OutOfRange,
        _ => TimestampError::NotAnInteger,
    })
}

/// Resolve a `createdAt` value to a zero-based month (0 = January) as seen
/// from `offset`.
pub fn month_index(raw: &str, offset: &FixedOffset) -> Result<usize, TimestampError> {
    let millis = parse_epoch_millis(raw)?;
    let instant = DateTime::from_timestamp_millis(millis).ok_or(TimestampError::OutOfRange)?;
    Ok(instant.with_timezone(offset).month0() as usize)
}
