use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{BasePublisher, PostPayload, PublishedPost};

/// WordPress REST API client.
///
/// Owns an explicit category/tag name-to-id cache. Entries are never
/// evicted; the cardinality of categories and tags is small and fixed.
pub struct WordPressClient {
    base_url: String,
    username: String,
    app_password: String,
    client: reqwest::Client,
    term_cache: Mutex<TermCache>,
}

#[derive(Default)]
struct TermCache {
    categories: HashMap<String, i64>,
    tags: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
struct WpPost {
    id: i64,
    link: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct WpTerm {
    id: i64,
    name: String,
}

impl WordPressClient {
    pub fn new(base_url: &str, username: &str, app_password: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            app_password: app_password.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            term_cache: Mutex::new(TermCache::default()),
        }
    }

    fn cached_category(&self, name: &str) -> Option<i64> {
        self.term_cache
            .lock()
            .ok()
            .and_then(|c| c.categories.get(name).copied())
    }

    fn cached_tag(&self, name: &str) -> Option<i64> {
        self.term_cache
            .lock()
            .ok()
            .and_then(|c| c.tags.get(name).copied())
    }

    fn cache_category(&self, name: &str, id: i64) {
        if let Ok(mut cache) = self.term_cache.lock() {
            cache.categories.insert(name.to_string(), id);
        }
    }

    fn cache_tag(&self, name: &str, id: i64) {
        if let Ok(mut cache) = self.term_cache.lock() {
            cache.tags.insert(name.to_string(), id);
        }
    }

    /// Resolve a term name to a WP id, creating the term if it is unknown.
    async fn resolve_term(&self, taxonomy: &str, name: &str) -> Result<i64> {
        let cached = match taxonomy {
            "categories" => self.cached_category(name),
            _ => self.cached_tag(name),
        };
        if let Some(id) = cached {
            return Ok(id);
        }

        let url = format!(
            "{}/wp-json/wp/v2/{}?search={}",
            self.base_url,
            taxonomy,
            urlencoding::encode(name)
        );
        let found: Vec<WpTerm> = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.app_password))
            .send()
            .await
            .context("Term lookup failed")?
            .json()
            .await
            .context("Term lookup response invalid")?;

        let id = match found.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
            Some(term) => term.id,
            None => {
                let created: WpTerm = self
                    .client
                    .post(format!("{}/wp-json/wp/v2/{}", self.base_url, taxonomy))
                    .basic_auth(&self.username, Some(&self.app_password))
                    .json(&serde_json::json!({ "name": name }))
                    .send()
                    .await
                    .context("Term creation failed")?
                    .json()
                    .await
                    .context("Term creation response invalid")?;
                created.id
            }
        };

        match taxonomy {
            "categories" => self.cache_category(name, id),
            _ => self.cache_tag(name, id),
        }
        Ok(id)
    }

    async fn build_body(&self, payload: &PostPayload) -> Result<serde_json::Value> {
        let mut body = serde_json::json!({
            "title": payload.title,
            "slug": payload.slug,
            "content": payload.content,
            "excerpt": payload.meta_description,
            "status": "publish",
        });

        if let Some(category) = &payload.category {
            let id = self.resolve_term("categories", category).await?;
            body["categories"] = serde_json::json!([id]);
        }

        if !payload.tags.is_empty() {
            let mut ids = Vec::with_capacity(payload.tags.len());
            for tag in &payload.tags {
                ids.push(self.resolve_term("tags", tag).await?);
            }
            body["tags"] = serde_json::json!(ids);
        }

        Ok(body)
    }
}

#[async_trait]
impl BasePublisher for WordPressClient {
    async fn create_post(&self, payload: &PostPayload) -> Result<PublishedPost> {
        let body = self.build_body(payload).await?;

        let response = self
            .client
            .post(format!("{}/wp-json/wp/v2/posts", self.base_url))
            .basic_auth(&self.username, Some(&self.app_password))
            .json(&body)
            .send()
            .await
            .context("Post creation failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("WordPress returned {}", response.status()));
        }

        let post: WpPost = response
            .json()
            .await
            .context("Post creation response invalid")?;

        Ok(PublishedPost {
            id: post.id,
            url: post.link,
            status: post.status,
        })
    }

    async fn update_post(&self, cms_post_id: i64, payload: &PostPayload) -> Result<PublishedPost> {
        let body = self.build_body(payload).await?;

        let response = self
            .client
            .post(format!(
                "{}/wp-json/wp/v2/posts/{}",
                self.base_url, cms_post_id
            ))
            .basic_auth(&self.username, Some(&self.app_password))
            .json(&body)
            .send()
            .await
            .context("Post update failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("WordPress returned {}", response.status()));
        }

        let post: WpPost = response
            .json()
            .await
            .context("Post update response invalid")?;

        Ok(PublishedPost {
            id: post.id,
            url: post.link,
            status: post.status,
        })
    }
}
