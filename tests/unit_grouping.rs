// Unit tests for the grouping engine.
//
// Covers the partition property, strict threshold membership, the month /
// global index relationship, idempotence, empty and absent input, and both
// invalid-timestamp policies.

use postlens::error::{GroupingError, TimestampError};
use postlens::grouping::{group, Grouper, InvalidTimestampPolicy, DEFAULT_MIN_LIKELIHOOD};
use postlens::posts::models::{Author, Post, Topic};

// 2021-01-07, 2021-01-20, 2021-02-06, 2021-07-07 (UTC)
const JAN_A: &str = "1610000000000";
const JAN_B: &str = "1611100000000";
const FEB: &str = "1612600000000";
const JUL: &str = "1625650000000";

fn make_post(id: &str, created_at: &str, topics: &[(&str, f64)]) -> Post {
    Post {
        id: id.to_string(),
        title: format!("Post {id}"),
        created_at: created_at.to_string(),
        author: Author {
            id: format!("author-{}", id.len() % 2),
            first_name: "Test".to_string(),
            last_name: "Author".to_string(),
        },
        likely_topics: topics
            .iter()
            .map(|(label, likelihood)| Topic {
                label: label.to_string(),
                likelihood: *likelihood,
            })
            .collect(),
    }
}

fn ids(posts: &[&Post]) -> Vec<String> {
    posts.iter().map(|p| p.id.clone()).collect()
}

fn sample_batch() -> Vec<Post> {
    vec![
        make_post("1", JAN_A, &[("sports", 0.5)]),
        make_post("2", FEB, &[("politics", 0.9), ("sports", 0.1)]),
        make_post("3", JAN_B, &[("sports", 0.5), ("politics", 0.3)]),
        make_post("4", JUL, &[("art", 0.25), ("sports", 0.2)]),
        make_post("5", JUL, &[]),
    ]
}

// ============================================================
// Concrete scenario
// ============================================================

#[test]
fn two_january_posts_scenario() {
    let posts = vec![
        make_post("r1", JAN_A, &[("sports", 0.5)]),
        make_post("r2", JAN_B, &[("sports", 0.5), ("politics", 0.3)]),
    ];
    let grouped = group(Some(&posts[..]), 0.2).unwrap();

    let jan = grouped.month(0).unwrap();
    assert_eq!(jan.posts.len(), 2);
    assert_eq!(jan.topics.count("sports"), 2);
    assert_eq!(jan.topics.count("politics"), 1);
    assert_eq!(grouped.topics().count("sports"), 2);
    assert_eq!(grouped.topics().count("politics"), 1);
}

// ============================================================
// Partition property
// ============================================================

#[test]
fn every_post_lands_in_exactly_one_month() {
    let posts = sample_batch();
    let grouped = group(Some(&posts[..]), DEFAULT_MIN_LIKELIHOOD).unwrap();

    assert_eq!(grouped.total_posts(), posts.len());
    let sum: usize = grouped.months().iter().map(|m| m.posts.len()).sum();
    assert_eq!(sum, posts.len());

    for post in &posts {
        let homes = grouped
            .months()
            .iter()
            .filter(|m| m.posts.iter().any(|p| p.id == post.id))
            .count();
        assert_eq!(homes, 1, "post {} should be in exactly one month", post.id);
    }

    assert_eq!(ids(&grouped.month(0).unwrap().posts), vec!["1", "3"]);
    assert_eq!(ids(&grouped.month(1).unwrap().posts), vec!["2"]);
    assert_eq!(ids(&grouped.month(6).unwrap().posts), vec!["4", "5"]);
}

// ============================================================
// Threshold membership
// ============================================================

#[test]
fn topic_membership_follows_strict_threshold() {
    let posts = sample_batch();
    for threshold in [0.0, 0.1, 0.2, 0.25, 0.3, 0.5, 0.9] {
        let grouped = group(Some(&posts[..]), threshold).unwrap();
        for label in ["sports", "politics", "art"] {
            let expected: Vec<String> = {
                // Month order, then input order within the month
                let mut listed = Vec::new();
                for bucket in grouped.months() {
                    for post in &bucket.posts {
                        if post
                            .likely_topics
                            .iter()
                            .any(|t| t.label == label && t.likelihood > threshold)
                        {
                            listed.push(post.id.clone());
                        }
                    }
                }
                listed
            };
            let actual = grouped.topics().get(label).map(ids).unwrap_or_default();
            assert_eq!(actual, expected, "label {label} at threshold {threshold}");
        }
    }
}

#[test]
fn likelihood_equal_to_threshold_is_excluded() {
    let posts = vec![make_post("1", JAN_A, &[("edge", 0.2), ("above", 0.2000001)])];
    let grouped = group(Some(&posts[..]), 0.2).unwrap();

    assert!(!grouped.topics().contains_key("edge"));
    assert!(!grouped.month(0).unwrap().topics.contains_key("edge"));
    assert_eq!(grouped.topics().count("above"), 1);
}

#[test]
fn topics_never_above_threshold_are_absent() {
    let posts = vec![
        make_post("1", JAN_A, &[("faint", 0.05)]),
        make_post("2", FEB, &[("faint", 0.1)]),
    ];
    let grouped = group(Some(&posts[..]), 0.2).unwrap();
    assert!(grouped.topics().is_empty());
    assert!(grouped.topics().get("faint").is_none());
}

#[test]
fn repeated_label_on_one_post_is_listed_once() {
    let posts = vec![make_post("1", JAN_A, &[("sports", 0.5), ("sports", 0.7)])];
    let grouped = group(Some(&posts[..]), 0.2).unwrap();
    assert_eq!(grouped.topics().count("sports"), 1);
    assert_eq!(grouped.month(0).unwrap().topics.count("sports"), 1);
}

#[test]
fn global_index_is_concatenation_of_month_indexes() {
    // Input deliberately out of chronological order
    let posts = vec![
        make_post("jul", JUL, &[("sports", 0.9)]),
        make_post("feb", FEB, &[("sports", 0.9), ("art", 0.9)]),
        make_post("jan", JAN_A, &[("art", 0.9)]),
    ];
    let grouped = group(Some(&posts[..]), 0.2).unwrap();

    for label in grouped.topics().keys() {
        let concatenated: Vec<String> = grouped
            .months()
            .iter()
            .flat_map(|m| m.topics.get(label).map(ids).unwrap_or_default())
            .collect();
        assert_eq!(ids(grouped.topics().get(label).unwrap()), concatenated);
    }
    assert_eq!(grouped.topics().keys().collect::<Vec<_>>(), vec!["art", "sports"]);
}

// ============================================================
// Idempotence and lifecycle
// ============================================================

#[test]
fn grouping_twice_is_deeply_equal() {
    let posts = sample_batch();
    let first = group(Some(&posts[..]), 0.2).unwrap();
    let second = group(Some(&posts[..]), 0.2).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn grouping_does_not_mutate_input() {
    let posts = sample_batch();
    let before = posts.clone();
    let _ = group(Some(&posts[..]), 0.2);
    assert_eq!(posts, before);
}

// ============================================================
// Empty and absent input
// ============================================================

#[test]
fn empty_batch_gives_empty_views() {
    let posts: Vec<Post> = Vec::new();
    let grouped = group(Some(&posts[..]), 0.2).unwrap();
    assert!(grouped.is_empty());
    assert_eq!(grouped.occupied_months().count(), 0);
    assert!(grouped.months().iter().all(|m| m.is_empty()));
    assert!(grouped.topics().is_empty());
    assert!(grouped.authors().is_empty());
}

#[test]
fn absent_batch_gives_no_result() {
    assert!(group(None, 0.2).is_none());
}

// ============================================================
// Invalid timestamps
// ============================================================

#[test]
fn invalid_timestamps_are_skipped_by_default() {
    let posts = vec![
        make_post("good", JAN_A, &[("sports", 0.9)]),
        make_post("words", "last tuesday", &[("sports", 0.9)]),
        make_post("fraction", "1610000000000.5", &[("sports", 0.9)]),
        make_post("huge", &i64::MAX.to_string(), &[("sports", 0.9)]),
        make_post("overflow", &u64::MAX.to_string(), &[("sports", 0.9)]),
    ];
    let grouped = group(Some(&posts[..]), 0.2).unwrap();

    assert_eq!(grouped.total_posts(), 1);
    assert_eq!(grouped.topics().count("sports"), 1);
    assert_eq!(grouped.authors().membership_count(), 1);

    let skipped: Vec<(&str, TimestampError)> = grouped
        .skipped()
        .iter()
        .map(|s| (s.post_id.as_str(), s.reason))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("words", TimestampError::NotAnInteger),
            ("fraction", TimestampError::NotAnInteger),
            ("huge", TimestampError::OutOfRange),
            ("overflow", TimestampError::OutOfRange),
        ]
    );
}

#[test]
fn reject_policy_reports_the_first_bad_post() {
    let posts = vec![
        make_post("good", JAN_A, &[]),
        make_post("bad", "soon", &[]),
        make_post("worse", "", &[]),
    ];
    let result = Grouper::new(0.2)
        .with_invalid_timestamps(InvalidTimestampPolicy::Reject)
        .group(&posts);

    assert_eq!(
        result.unwrap_err(),
        GroupingError::InvalidTimestamp {
            post_id: "bad".to_string(),
            value: "soon".to_string(),
            reason: TimestampError::NotAnInteger,
        }
    );
}

#[test]
fn invalid_timestamp_error_message_names_the_post() {
    let err = GroupingError::InvalidTimestamp {
        post_id: "p9".to_string(),
        value: "abc".to_string(),
        reason: TimestampError::NotAnInteger,
    };
    let message = err.to_string();
    assert!(message.contains("p9"));
    assert!(message.contains("abc"));
}

// ============================================================
// Offsets and authors
// ============================================================

#[test]
fn utc_offset_moves_posts_across_month_boundary() {
    // 2021-01-31T23:30:00Z
    let posts = vec![make_post("edge", "1612135800000", &[])];

    let utc = Grouper::new(0.2).group(&posts).unwrap();
    assert_eq!(utc.month(0).unwrap().len(), 1);

    let plus_one = chrono::FixedOffset::east_opt(3600).unwrap();
    let shifted = Grouper::new(0.2)
        .with_utc_offset(plus_one)
        .group(&posts)
        .unwrap();
    assert_eq!(shifted.month(1).unwrap().len(), 1);
}

#[test]
fn authors_are_indexed_in_first_seen_order() {
    let posts = sample_batch();
    let grouped = group(Some(&posts[..]), 0.2).unwrap();
    // ids "1".."5" all have length 1 -> one author
    assert_eq!(grouped.authors().keys().collect::<Vec<_>>(), vec!["author-1"]);
    assert_eq!(grouped.authors().count("author-1"), 5);
}
