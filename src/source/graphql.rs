// GraphQL source — the `allPosts(count: $amount)` query over HTTP.
//
// One POST per batch, no pagination: the API hands back up to `amount`
// posts in a single response.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::PostSource;
use crate::posts::models::Post;

/// The posts query, selecting every field the views need.
pub const GET_POSTS_QUERY: &str = "query Posts($amount: Int) {
  allPosts(count: $amount) {
    id
    title
    createdAt
    author {
      id
      firstName
      lastName
    }
    likelyTopics {
      label
      likelihood
    }
  }
}";

/// Body of a posts request.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: PostsVariables,
}

#[derive(Debug, Serialize)]
pub struct PostsVariables {
    pub amount: u32,
}

/// The `data` object of a posts response.
#[derive(Debug, Deserialize)]
pub struct PostsData {
    #[serde(rename = "allPosts")]
    pub all_posts: Vec<Post>,
}

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Envelope of a GraphQL response.
#[derive(Debug, Deserialize)]
pub struct PostsResponse {
    pub data: Option<PostsData>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

/// Build the JSON request body for a batch of `amount` posts.
pub fn request_body(amount: u32) -> GraphqlRequest {
    GraphqlRequest {
        query: GET_POSTS_QUERY,
        variables: PostsVariables { amount },
    }
}

/// Turn a decoded response into posts. Any GraphQL error fails the batch;
/// partial data is not used.
pub fn posts_from_response(response: PostsResponse) -> Result<Vec<Post>> {
    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        anyhow::bail!("GraphQL query failed: {}", messages.join("; "));
    }

    response
        .data
        .map(|data| data.all_posts)
        .ok_or_else(|| anyhow::anyhow!("GraphQL response had neither data nor errors"))
}

/// HTTP client for a GraphQL endpoint serving `allPosts`.
pub struct GraphqlSource {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlSource {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("postlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl PostSource for GraphqlSource {
    async fn fetch_posts(&self, amount: u32) -> Result<Vec<Post>> {
        debug!(endpoint = %self.endpoint, amount, "GraphQL posts request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body(amount))
            .send()
            .await
            .with_context(|| format!("GraphQL request to {} failed", self.endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GraphQL endpoint {} returned {status}: {body}", self.endpoint);
        }

        let decoded: PostsResponse = response
            .json()
            .await
            .context("Failed to deserialize GraphQL posts response")?;

        let posts = posts_from_response(decoded)?;

        info!(
            count = posts.len(),
            endpoint = %self.endpoint,
            "Fetched posts from GraphQL"
        );

        Ok(posts)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_carries_amount() {
        let body = serde_json::to_value(request_body(250)).unwrap();
        assert_eq!(body["variables"]["amount"], 250);
        assert!(body["query"].as_str().unwrap().contains("allPosts(count: $amount)"));
    }

    #[test]
    fn test_errors_fail_the_batch() {
        let json = r#"{"data": null, "errors": [{"message": "boom"}, {"message": "again"}]}"#;
        let response: PostsResponse = serde_json::from_str(json).unwrap();
        let err = posts_from_response(response).unwrap_err();
        assert!(err.to_string().contains("boom; again"));
    }

    #[test]
    fn test_missing_data_is_an_error() {
        let response: PostsResponse = serde_json::from_str("{}").unwrap();
        assert!(posts_from_response(response).is_err());
    }
}
