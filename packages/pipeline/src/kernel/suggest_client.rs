use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::{BaseSuggestionProvider, Suggestion};

/// Search-suggestion API client.
///
/// Talks to a suggest endpoint that returns the classic
/// `[query, [completions...]]` JSON array. Retry with backoff is this
/// adapter's own responsibility; the pipeline core never retries.
pub struct SuggestClient {
    base_url: String,
    client: reqwest::Client,
    max_attempts: u32,
}

impl SuggestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            max_attempts: 3,
        }
    }

    async fn fetch_once(&self, keyword: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/complete/search?client=firefox&q={}",
            self.base_url,
            urlencoding::encode(keyword)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Suggest request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Suggest API returned {}", response.status()));
        }

        // Response shape: ["keyword", ["suggestion 1", "suggestion 2", ...]]
        let body: serde_json::Value = response
            .json()
            .await
            .context("Suggest response was not valid JSON")?;

        let completions = body
            .get(1)
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("Suggest response missing completions array"))?;

        Ok(completions
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect())
    }
}

#[async_trait]
impl BaseSuggestionProvider for SuggestClient {
    async fn discover(&self, keyword: &str) -> Result<Vec<Suggestion>> {
        let mut last_err = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let backoff = Duration::from_millis(500 * 2u64.pow(attempt));
                tokio::time::sleep(backoff).await;
            }

            match self.fetch_once(keyword).await {
                Ok(completions) => {
                    // Earlier completions rank higher on the suggest API.
                    return Ok(completions
                        .into_iter()
                        .enumerate()
                        .map(|(i, query)| Suggestion {
                            query,
                            relevance: (1.0 - i as f64 * 0.05).max(0.1),
                        })
                        .collect());
                }
                Err(e) => {
                    tracing::warn!(keyword, attempt, error = %e, "Suggest fetch failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Suggest fetch failed")))
    }
}
