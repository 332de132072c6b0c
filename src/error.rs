// Domain errors for the grouping engine.
//
// Application-level code (sources, output, CLI) uses anyhow. These types
// exist so callers of the engine can match on the one failure it can
// report: a post whose `createdAt` cannot be placed in a month.

use thiserror::Error;

/// Why a `createdAt` value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Empty, non-numeric, or fractional value
    #[error("not an integer number of milliseconds")]
    NotAnInteger,

    /// An integer too large for i64 or outside the representable calendar range
    #[error("outside the representable date range")]
    OutOfRange,
}

/// Errors that can occur while grouping posts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    /// A post's timestamp could not be mapped to a calendar month
    #[error("Invalid timestamp {value:?} on post {post_id}: {reason}")]
    InvalidTimestamp {
        post_id: String,
        value: String,
        reason: TimestampError,
    },
}
