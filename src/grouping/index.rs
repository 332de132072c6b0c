// Ordered key → posts index.
//
// Used for the per-month topic index, the global topic index and the author
// index. Keys keep their first-seen order, which the correlation rows and
// every rendered view rely on.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::posts::models::Post;

/// One key and the posts filed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry<'a> {
    pub key: String,
    pub posts: Vec<&'a Post>,
}

/// Mapping from a string key to the posts filed under it, in first-seen
/// key order. A key is only ever created together with its first post, so
/// no key maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostIndex<'a> {
    entries: Vec<IndexEntry<'a>>,
    positions: HashMap<String, usize>,
}

impl<'a> PostIndex<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `post` under `key`, creating the key on first touch.
    pub fn push(&mut self, key: &str, post: &'a Post) {
        match self.positions.get(key) {
            Some(&pos) => self.entries[pos].posts.push(post),
            None => {
                self.positions.insert(key.to_string(), self.entries.len());
                self.entries.push(IndexEntry {
                    key: key.to_string(),
                    posts: vec![post],
                });
            }
        }
    }

    /// Append every entry of `other`, keeping this index's key order and
    /// adding unseen keys at the end.
    pub fn extend_from(&mut self, other: &PostIndex<'a>) {
        for entry in &other.entries {
            for &post in &entry.posts {
                self.push(&entry.key, post);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[&'a Post]> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].posts.as_slice())
    }

    /// Number of posts under `key` (0 when the key is absent).
    pub fn count(&self, key: &str) -> usize {
        self.get(key).map_or(0, <[_]>::len)
    }

    /// Position of `key` in first-seen order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn entries(&self) -> &[IndexEntry<'a>] {
        &self.entries
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (key, post) memberships across all keys.
    pub fn membership_count(&self) -> usize {
        self.entries.iter().map(|e| e.posts.len()).sum()
    }
}

// Serialized as a JSON object in key order: `{"sports": [post, ...], ...}`.
impl Serialize for PostIndex<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.key, &entry.posts)?;
        }
        map.end()
    }
}
