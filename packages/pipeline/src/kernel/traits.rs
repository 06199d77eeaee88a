// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (scoring, admission, quality gating) lives in domain
// functions that consume these traits.
//
// Naming convention: Base* for trait names (e.g., BaseWriter, BasePublisher)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Suggestion Provider Trait (Infrastructure - search-suggestion discovery)
// =============================================================================

/// A single discovered candidate query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub query: String,
    pub relevance: f64,
}

#[async_trait]
pub trait BaseSuggestionProvider: Send + Sync {
    /// Fetch suggested queries for a seed keyword.
    ///
    /// May fail per call; the caller applies its own pacing.
    async fn discover(&self, keyword: &str) -> Result<Vec<Suggestion>>;
}

// =============================================================================
// Trend Source Trait (Infrastructure - best-effort keyword discovery)
// =============================================================================

#[async_trait]
pub trait BaseTrendSource: Send + Sync {
    /// Fetch currently trending topic phrases.
    async fn trending(&self) -> Result<Vec<String>>;
}

// =============================================================================
// Writer Trait (Infrastructure - generative text)
// =============================================================================

/// Structured outline for an article, produced before full generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleOutline {
    pub title: String,
    pub meta_description: String,
    pub sections: Vec<String>,
    pub faq_questions: Vec<String>,
}

/// A fully generated article draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub meta_description: String,
    /// HTML body.
    pub content: String,
    pub word_count: usize,
    /// H2/H3 heading texts, in document order.
    pub headings: Vec<String>,
    pub has_faq: bool,
    pub has_sources: bool,
    pub has_disclaimer: bool,
}

#[async_trait]
pub trait BaseWriter: Send + Sync {
    /// Produce an outline for a query. Failures propagate as item failures.
    async fn generate_outline(&self, query: &str, context: Option<&str>)
        -> Result<ArticleOutline>;

    /// Produce a full article from an approved outline.
    async fn generate_article(
        &self,
        query: &str,
        outline: &ArticleOutline,
        category: Option<&str>,
    ) -> Result<ArticleDraft>;
}

// =============================================================================
// Publisher Trait (Infrastructure - CMS endpoint)
// =============================================================================

/// Payload sent to the CMS when creating or updating a post.
#[derive(Debug, Clone, Serialize)]
pub struct PostPayload {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub meta_description: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// The CMS's view of a post after a write.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedPost {
    pub id: i64,
    pub url: String,
    pub status: String,
}

#[async_trait]
pub trait BasePublisher: Send + Sync {
    /// Create a post on the CMS. Failures propagate as item failures.
    async fn create_post(&self, payload: &PostPayload) -> Result<PublishedPost>;

    /// Update an existing post on the CMS.
    async fn update_post(&self, cms_post_id: i64, payload: &PostPayload) -> Result<PublishedPost>;
}
