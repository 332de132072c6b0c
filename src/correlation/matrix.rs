// Topic correlation — Jaccard overlap between topics' post sets.
//
// For topics A and B:
//
//   score(A, B) = overlap(A, B) / (|A| + |B| - overlap(A, B))
//
// where |A| is the number of posts filed under A and overlap(A, B) is the
// number of posts carrying both labels above the threshold. This is the size
// of the intersection over the size of the union, so it lies in [0, 1] and a
// topic scores exactly 1 against itself.
//
// Overlaps come from one pass over the distinct posts of the index, adding 1
// to every (i, j) pair of lists the post is filed under, self-pairs included.
// The count matrix is symmetric by construction.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::grouping::index::PostIndex;
use crate::posts::models::Post;

/// One cell of a correlation row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationBin {
    pub topic: String,
    /// Overlap score in [0, 1]; NaN when both topics have no posts
    pub score: f64,
}

/// One row of the matrix: a topic against every topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRow {
    pub topic: String,
    /// One bin per topic, in reverse index order so that a square grid
    /// drawn bottom-up lines rows up with columns
    pub bins: Vec<CorrelationBin>,
}

/// Pairwise topic overlap scores.
///
/// Rows follow the topic index's key order; each row's bins follow the
/// reverse of that order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CorrelationMatrix {
    rows: Vec<CorrelationRow>,
}

impl CorrelationMatrix {
    pub fn rows(&self) -> &[CorrelationRow] {
        &self.rows
    }

    /// Topic labels in row order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.topic.as_str())
    }

    /// Score of `a` against `b`, or `None` if either topic is unknown.
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.topic == a)?
            .bins
            .iter()
            .find(|bin| bin.topic == b)
            .map(|bin| bin.score)
    }

    /// Number of topics (the matrix is `len() x len()`).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Count, for every pair of topics in `topics`, the posts carrying both.
///
/// Returns a square matrix indexed by key position. Each distinct post is
/// visited once and adds 1 to every pair of the lists it is filed under,
/// restricted to labels that also clear `min_likelihood`. Passing the
/// threshold the index was built with yields list sizes on the diagonal.
pub fn count_overlaps(topics: &PostIndex<'_>, min_likelihood: f64) -> Vec<Vec<u32>> {
    let n = topics.len();
    let mut counts = vec![vec![0u32; n]; n];

    // Post identity -> positions of the lists it is filed under
    let mut memberships: HashMap<*const Post, (&Post, Vec<usize>)> = HashMap::new();
    for (list_pos, entry) in topics.entries().iter().enumerate() {
        for &post in &entry.posts {
            memberships
                .entry(post as *const Post)
                .or_insert_with(|| (post, Vec::new()))
                .1
                .push(list_pos);
        }
    }

    for (post, lists) in memberships.values() {
        let labels = post.qualifying_labels(min_likelihood);
        let positions: Vec<usize> = lists
            .iter()
            .copied()
            .filter(|&pos| labels.contains(&topics.entries()[pos].key.as_str()))
            .collect();

        for &i in &positions {
            for &j in &positions {
                counts[i][j] += 1;
            }
        }
    }

    counts
}

/// Build the correlation matrix for a topic index.
pub fn correlate(topics: &PostIndex<'_>, min_likelihood: f64) -> CorrelationMatrix {
    let counts = count_overlaps(topics, min_likelihood);
    let entries = topics.entries();

    let rows: Vec<CorrelationRow> = entries
        .iter()
        .enumerate()
        .map(|(a, row_entry)| {
            let bins = entries
                .iter()
                .enumerate()
                .rev()
                .map(|(b, bin_entry)| {
                    let overlap = counts[a][b] as f64;
                    let union = row_entry.posts.len() as f64 + bin_entry.posts.len() as f64 - overlap;
                    CorrelationBin {
                        topic: bin_entry.key.clone(),
                        score: overlap / union,
                    }
                })
                .collect();

            CorrelationRow {
                topic: row_entry.key.clone(),
                bins,
            }
        })
        .collect();

    debug!(
        topics = rows.len(),
        min_likelihood = min_likelihood,
        "Built topic correlation matrix"
    );

    CorrelationMatrix { rows }
}
