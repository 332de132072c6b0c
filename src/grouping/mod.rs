// Grouping — month buckets, topic index and author index.

pub mod authors;
pub mod index;
pub mod months;

pub use index::{IndexEntry, PostIndex};
pub use months::{
    group, GroupedPosts, Grouper, InvalidTimestampPolicy, MonthBucket, SkippedPost,
    DEFAULT_MIN_LIKELIHOOD, MONTH_NAMES,
};
