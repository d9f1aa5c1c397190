//! # clients::sentiment — CryptoPanic news sentiment
//!
//! Looks at the 10 most recent public posts and counts how many mention
//! "bearish" anywhere in their JSON (title, votes, tags...).
//!
//! | bearish count | reading  |
//! |---------------|----------|
//! | >= 5          | Bearish  |
//! | <= 2          | Bullish  |
//! | otherwise     | Neutral  |

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::UpstreamError;
use crate::models::Sentiment;

const SAMPLE_SIZE: usize = 10;
const BEARISH_AT_LEAST: usize = 5;
const BULLISH_AT_MOST: usize = 2;

/// Never fails: any upstream problem reads as [`Sentiment::Neutral`].
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn fetch_sentiment(&self) -> Sentiment;
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Value>,
}

/// Classify the first [`SAMPLE_SIZE`] posts.  An empty list is Neutral.
pub fn classify(posts: &[Value]) -> Sentiment {
    if posts.is_empty() {
        return Sentiment::Neutral;
    }

    let bearish = posts
        .iter()
        .take(SAMPLE_SIZE)
        .filter(|post| post.to_string().to_lowercase().contains("bearish"))
        .count();

    if bearish >= BEARISH_AT_LEAST {
        Sentiment::Bearish
    } else if bearish <= BULLISH_AT_MOST {
        Sentiment::Bullish
    } else {
        Sentiment::Neutral
    }
}

// ─── CryptoPanic ──────────────────────────────────────────────────────────────

pub struct CryptoPanicSource {
    client:    reqwest::Client,
    base_url:  String,
    api_key:   String,
    timeout:   Duration,
}

impl CryptoPanicSource {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            timeout,
        }
    }

    async fn fetch_posts(&self) -> Result<Vec<Value>, UpstreamError> {
        let url = format!("{}/api/v1/posts/", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("auth_token", self.api_key.as_str()), ("public", "true")])
            .timeout(self.timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let data: PostsResponse = resp.json().await?;
        Ok(data.results)
    }
}

#[async_trait]
impl SentimentSource for CryptoPanicSource {
    async fn fetch_sentiment(&self) -> Sentiment {
        match self.fetch_posts().await {
            Ok(posts) => {
                let sentiment = classify(&posts);
                debug!(posts = posts.len(), ?sentiment, "📰 News sentiment classified");
                sentiment
            }
            Err(e) => {
                warn!(error = %e, "CryptoPanic unavailable — sentiment defaults to NEUTRAL");
                Sentiment::Neutral
            }
        }
    }
}
