// JSON file source — posts previously exported from the API.
//
// Accepts three shapes so a raw API dump can be used as-is:
//   [ {post}, ... ]
//   { "allPosts": [ ... ] }
//   { "data": { "allPosts": [ ... ] } }

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::graphql::PostsData;
use super::traits::PostSource;
use crate::posts::models::Post;

#[derive(Deserialize)]
#[serde(untagged)]
enum PostsFile {
    Bare(Vec<Post>),
    Data(PostsData),
    Response { data: PostsData },
}

impl PostsFile {
    fn into_posts(self) -> Vec<Post> {
        match self {
            PostsFile::Bare(posts) => posts,
            PostsFile::Data(data) | PostsFile::Response { data } => data.all_posts,
        }
    }
}

/// Parse a posts file body, keeping at most `amount` posts.
pub fn parse_posts_json(body: &str, amount: u32) -> Result<Vec<Post>> {
    let file: PostsFile = serde_json::from_str(body)
        .context("Posts JSON must be an array of posts, {\"allPosts\": [...]} or {\"data\": {\"allPosts\": [...]}}")?;
    let mut posts = file.into_posts();
    posts.truncate(amount as usize);
    Ok(posts)
}

/// Reads posts from a JSON file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl PostSource for FileSource {
    async fn fetch_posts(&self, amount: u32) -> Result<Vec<Post>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read posts file {}", self.path.display()))?;

        let posts = parse_posts_json(&body, amount)
            .with_context(|| format!("Failed to parse posts file {}", self.path.display()))?;

        info!(
            count = posts.len(),
            path = %self.path.display(),
            "Loaded posts from file"
        );

        Ok(posts)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = r#"{
        "id": "1", "title": "t", "createdAt": "1610000000000",
        "author": {"id": "a", "firstName": "A", "lastName": "B"},
        "likelyTopics": [{"label": "sports", "likelihood": 0.5}]
    }"#;

    #[test]
    fn test_parse_bare_array() {
        let body = format!("[{POST}, {POST}]");
        let posts = parse_posts_json(&body, 100).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].likely_topics[0].label, "sports");
    }

    #[test]
    fn test_parse_all_posts_object() {
        let body = format!(r#"{{"allPosts": [{POST}]}}"#);
        assert_eq!(parse_posts_json(&body, 100).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_graphql_response() {
        let body = format!(r#"{{"data": {{"allPosts": [{POST}, {POST}, {POST}]}}}}"#);
        assert_eq!(parse_posts_json(&body, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(parse_posts_json(r#"{"posts": []}"#, 100).is_err());
        assert!(parse_posts_json("not json", 100).is_err());
    }
}
