// Post data model — the records every view is built from.
//
// Field names follow the GraphQL `allPosts` shape (camelCase on the wire).
// Posts are treated as read-only input: grouping and correlation borrow
// them and never mutate them.

use serde::{Deserialize, Deserializer, Serialize};

/// The author of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    /// "First Last", or whichever half is present.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A probabilistic topic label attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub label: String,
    /// Confidence in [0, 1] that the post is about this topic
    pub likelihood: f64,
}

/// A single content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Epoch milliseconds as sent by the API. Kept as text so a bad value
    /// can be reported verbatim; see `posts::timestamp` for validation.
    #[serde(deserialize_with = "created_at_text")]
    pub created_at: String,
    pub author: Author,
    #[serde(default)]
    pub likely_topics: Vec<Topic>,
}

impl Post {
    /// Labels whose likelihood is strictly above `min_likelihood`, in the
    /// order they appear on the post. A label repeated on the same post is
    /// returned once.
    pub fn qualifying_labels(&self, min_likelihood: f64) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.likely_topics.len());
        for topic in &self.likely_topics {
            if topic.likelihood > min_likelihood && !labels.contains(&topic.label.as_str()) {
                labels.push(&topic.label);
            }
        }
        labels
    }
}

/// Accept `createdAt` as either a JSON string or a JSON number. A whole
/// number written as a float (`1610000000000.0`) is kept as integer text;
/// string values are kept verbatim.
fn created_at_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(text) => text,
        RawTimestamp::Number(number) => match number.as_f64() {
            Some(value)
                if number.is_f64()
                    && value.fract() == 0.0
                    && (i64::MIN as f64..i64::MAX as f64).contains(&value) =>
            {
                format!("{}", value as i64)
            }
            _ => number.to_string(),
        },
    })
}
