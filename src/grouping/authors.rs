// Per-author summaries built from the author index.

use serde::Serialize;

use super::months::GroupedPosts;
use crate::posts::models::Author;

/// One author and what they posted about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary<'a> {
    pub author: &'a Author,
    pub post_count: usize,
    /// Qualifying topic labels across the author's posts, most frequent
    /// first (ties keep first-seen order)
    pub top_topics: Vec<(String, usize)>,
}

/// Summarize every author in the batch, busiest first. Authors with the
/// same post count keep their first-seen order.
pub fn summarize_authors<'a>(grouped: &GroupedPosts<'a>) -> Vec<AuthorSummary<'a>> {
    let min_likelihood = grouped.min_likelihood();

    let mut summaries: Vec<AuthorSummary<'a>> = grouped
        .authors()
        .entries()
        .iter()
        .filter_map(|entry| {
            let first = *entry.posts.first()?;

            let mut top_topics: Vec<(String, usize)> = Vec::new();
            for post in &entry.posts {
                for label in post.qualifying_labels(min_likelihood) {
                    match top_topics.iter_mut().find(|(l, _)| l == label) {
                        Some((_, count)) => *count += 1,
                        None => top_topics.push((label.to_string(), 1)),
                    }
                }
            }
            top_topics.sort_by(|a, b| b.1.cmp(&a.1));

            Some(AuthorSummary {
                author: &first.author,
                post_count: entry.posts.len(),
                top_topics,
            })
        })
        .collect();

    summaries.sort_by(|a, b| b.post_count.cmp(&a.post_count));
    summaries
}
