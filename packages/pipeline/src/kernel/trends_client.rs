use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::BaseTrendSource;

/// Trending-topics feed client.
///
/// Reads a trends RSS feed and returns item titles. Consumed best-effort by
/// the strategy phase; a failure here never fails a pipeline run.
pub struct TrendsClient {
    feed_url: String,
    client: reqwest::Client,
}

impl TrendsClient {
    pub fn new(feed_url: &str) -> Self {
        Self {
            feed_url: feed_url.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl BaseTrendSource for TrendsClient {
    async fn trending(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .context("Trends request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Trends feed returned {}", response.status()));
        }

        let body = response.text().await.context("Trends body unreadable")?;
        Ok(extract_titles(&body))
    }
}

/// Pull `<title>` texts out of an RSS body, skipping the channel title.
fn extract_titles(rss: &str) -> Vec<String> {
    let mut titles = Vec::new();
    let mut rest = rss;
    while let Some(start) = rest.find("<title>") {
        let after = &rest[start + 7..];
        if let Some(end) = after.find("</title>") {
            let title = after[..end].trim();
            if !title.is_empty() {
                titles.push(title.to_string());
            }
            rest = &after[end + 8..];
        } else {
            break;
        }
    }
    // First <title> is the channel's own name.
    if !titles.is_empty() {
        titles.remove(0);
    }
    titles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_item_titles_and_skips_channel_title() {
        let rss = "<rss><channel><title>Daily Trends</title>\
                   <item><title>passport renewal delays</title></item>\
                   <item><title>new visa rules</title></item></channel></rss>";
        let titles = extract_titles(rss);
        assert_eq!(titles, vec!["passport renewal delays", "new visa rules"]);
    }

    #[test]
    fn empty_feed_yields_no_titles() {
        assert!(extract_titles("<rss></rss>").is_empty());
    }
}
