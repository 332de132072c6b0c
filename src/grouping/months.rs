// Grouping engine — posts by calendar month, by topic, and by author.
//
// One pass over the batch in input order. Each post lands in exactly one of
// twelve month buckets and, inside that bucket, under every topic label whose
// likelihood is strictly above the threshold. The global topic index is
// folded from the frozen month indexes afterwards, so it always equals the
// month-order concatenation of the per-month lists.

use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::index::PostIndex;
use crate::error::{GroupingError, TimestampError};
use crate::posts::models::Post;
use crate::posts::timestamp;

/// Default likelihood a topic must exceed to count for a post.
pub const DEFAULT_MIN_LIKELIHOOD: f64 = 0.2;

/// Three-letter month names, indexed by `MonthBucket::month_index`.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// What to do with a post whose `createdAt` cannot be placed in a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidTimestampPolicy {
    /// Leave the post out of every view and report it in `GroupedPosts::skipped`
    #[default]
    Skip,
    /// Fail the whole grouping with `GroupingError::InvalidTimestamp`
    Reject,
}

/// Posts sharing one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket<'a> {
    /// 0 = January .. 11 = December
    pub month_index: usize,
    /// Every post of the month, in input order
    pub posts: Vec<&'a Post>,
    /// Posts of the month filed under each qualifying topic label
    pub topics: PostIndex<'a>,
}

impl<'a> MonthBucket<'a> {
    fn empty(month_index: usize) -> Self {
        Self {
            month_index,
            posts: Vec::new(),
            topics: PostIndex::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.month_index]
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Fraction of this month's topic memberships that belong to `label`.
    /// The shares of all labels in a month sum to 1 (or all are 0).
    pub fn topic_share(&self, label: &str) -> f64 {
        let total = self.topics.membership_count();
        if total == 0 {
            return 0.0;
        }
        self.topics.count(label) as f64 / total as f64
    }

    /// Whole percentage of this month's posts tagged with `label`, rounded
    /// down.
    pub fn topic_percent(&self, label: &str) -> u32 {
        if self.posts.is_empty() {
            return 0;
        }
        (100 * self.topics.count(label) / self.posts.len()) as u32
    }
}

/// A post left out of grouping, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedPost {
    pub post_id: String,
    pub created_at: String,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: TimestampError,
}

fn serialize_reason<S: serde::Serializer>(
    reason: &TimestampError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(reason)
}

/// Everything the grouping pass derives from one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedPosts<'a> {
    min_likelihood: f64,
    /// Always twelve buckets; `months[i].month_index == i`
    months: Vec<MonthBucket<'a>>,
    topics: PostIndex<'a>,
    authors: PostIndex<'a>,
    skipped: Vec<SkippedPost>,
}

impl<'a> GroupedPosts<'a> {
    pub fn min_likelihood(&self) -> f64 {
        self.min_likelihood
    }

    /// All twelve month buckets, January first.
    pub fn months(&self) -> &[MonthBucket<'a>] {
        &self.months
    }

    /// The bucket for a zero-based month, if `month_index` is in 0..12.
    pub fn month(&self, month_index: usize) -> Option<&MonthBucket<'a>> {
        self.months.get(month_index)
    }

    /// Only the months that received at least one post.
    pub fn occupied_months(&self) -> impl Iterator<Item = &MonthBucket<'a>> {
        self.months.iter().filter(|m| !m.is_empty())
    }

    /// Global topic → posts index across all months.
    pub fn topics(&self) -> &PostIndex<'a> {
        &self.topics
    }

    /// Author id → posts index. The author's details are on any of its posts.
    pub fn authors(&self) -> &PostIndex<'a> {
        &self.authors
    }

    pub fn skipped(&self) -> &[SkippedPost] {
        &self.skipped
    }

    /// Number of posts placed in a month (skipped posts excluded).
    pub fn total_posts(&self) -> usize {
        self.months.iter().map(MonthBucket::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_posts() == 0
    }

    /// Post count per month, January first.
    pub fn month_counts(&self) -> [usize; 12] {
        let mut counts = [0; 12];
        for bucket in &self.months {
            counts[bucket.month_index] = bucket.len();
        }
        counts
    }

    /// Largest single-month post count (0 for an empty batch).
    pub fn busiest_month_count(&self) -> usize {
        self.month_counts().into_iter().max().unwrap_or(0)
    }
}

/// Configurable grouping pass.
#[derive(Debug, Clone)]
pub struct Grouper {
    /// A topic counts for a post only when its likelihood is strictly above this
    pub min_likelihood: f64,
    /// Offset used to decide which calendar month a timestamp falls in
    pub utc_offset: FixedOffset,
    pub invalid_timestamps: InvalidTimestampPolicy,
}

impl Default for Grouper {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LIKELIHOOD)
    }
}

impl Grouper {
    /// A grouper in UTC that skips posts with unusable timestamps.
    pub fn new(min_likelihood: f64) -> Self {
        Self {
            min_likelihood,
            utc_offset: Utc.fix(),
            invalid_timestamps: InvalidTimestampPolicy::Skip,
        }
    }

    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn with_invalid_timestamps(mut self, policy: InvalidTimestampPolicy) -> Self {
        self.invalid_timestamps = policy;
        self
    }

    /// Group a batch of posts.
    ///
    /// Only fails under `InvalidTimestampPolicy::Reject`.
    pub fn group<'a>(&self, posts: &'a [Post]) -> Result<GroupedPosts<'a>, GroupingError> {
        let mut months: Vec<MonthBucket<'a>> = (0..12).map(MonthBucket::empty).collect();
        let mut authors = PostIndex::new();
        let mut skipped = Vec::new();

        for post in posts {
            let month_index = match timestamp::month_index(&post.created_at, &self.utc_offset) {
                Ok(index) => index,
                Err(reason) => match self.invalid_timestamps {
                    InvalidTimestampPolicy::Reject => {
                        return Err(GroupingError::InvalidTimestamp {
                            post_id: post.id.clone(),
                            value: post.created_at.clone(),
                            reason,
                        });
                    }
                    InvalidTimestampPolicy::Skip => {
                        warn!(
                            post_id = %post.id,
                            created_at = %post.created_at,
                            %reason,
                            "Skipping post with invalid timestamp"
                        );
                        skipped.push(SkippedPost {
                            post_id: post.id.clone(),
                            created_at: post.created_at.clone(),
                            reason,
                        });
                        continue;
                    }
                },
            };

            let bucket = &mut months[month_index];
            bucket.posts.push(post);
            for label in post.qualifying_labels(self.min_likelihood) {
                bucket.topics.push(label, post);
            }
            authors.push(&post.author.id, post);
        }

        let mut topics = PostIndex::new();
        for bucket in &months {
            topics.extend_from(&bucket.topics);
        }

        debug!(
            posts = posts.len(),
            skipped = skipped.len(),
            topics = topics.len(),
            authors = authors.len(),
            min_likelihood = self.min_likelihood,
            "Grouped posts"
        );

        Ok(GroupedPosts {
            min_likelihood: self.min_likelihood,
            months,
            topics,
            authors,
            skipped,
        })
    }
}

/// Group posts with the default UTC grouper.
///
/// Returns `None` when there is no batch yet, so callers can tell "not
/// computed" apart from "computed and empty". Posts with unusable
/// timestamps are skipped.
pub fn group(posts: Option<&[Post]>, min_likelihood: f64) -> Option<GroupedPosts<'_>> {
    let posts = posts?;
    Grouper::new(min_likelihood).group(posts).ok()
}
