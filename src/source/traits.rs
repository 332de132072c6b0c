// Post source trait — where a batch of posts comes from.
//
// The grouping and correlation engines never fetch anything themselves; the
// CLI picks a source, fetches one bounded batch, and hands the slice over.

use anyhow::Result;
use async_trait::async_trait;

use crate::posts::models::Post;

/// Largest batch a source will be asked for.
pub const MAX_AMOUNT: u32 = 1000;

/// Batch size used when none is configured.
pub const DEFAULT_AMOUNT: u32 = 100;

/// Clamp a requested batch size to `1..=MAX_AMOUNT`.
pub fn clamp_amount(amount: u32) -> u32 {
    amount.clamp(1, MAX_AMOUNT)
}

/// Trait for fetching a batch of posts. Async because the GraphQL source
/// goes over HTTP.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch at most `amount` posts.
    async fn fetch_posts(&self, amount: u32) -> Result<Vec<Post>>;

    /// Short human-readable description (file path or endpoint URL).
    fn describe(&self) -> String;
}
