// Mock collaborator implementations for testing
//
// Provides mock providers that can be injected into PipelineKernel (or used
// directly) in tests. Each mock records the calls it receives and returns
// queued responses.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{
    ArticleDraft, ArticleOutline, BasePublisher, BaseSuggestionProvider, BaseTrendSource,
    BaseWriter, PostPayload, PublishedPost, Suggestion,
};

// =============================================================================
// Mock Suggestion Provider
// =============================================================================

pub struct MockSuggestionProvider {
    responses: Arc<Mutex<Vec<Vec<Suggestion>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl MockSuggestionProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Queue one discover() response built from (query, relevance) pairs.
    pub fn with_suggestions(self, suggestions: Vec<(&str, f64)>) -> Self {
        let batch = suggestions
            .into_iter()
            .map(|(query, relevance)| Suggestion {
                query: query.to_string(),
                relevance,
            })
            .collect();
        self.responses.lock().unwrap().push(batch);
        self
    }

    /// Make every discover() call fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Keywords that were passed to discover(), in order.
    pub fn discover_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockSuggestionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSuggestionProvider for MockSuggestionProvider {
    async fn discover(&self, keyword: &str) -> Result<Vec<Suggestion>> {
        self.calls.lock().unwrap().push(keyword.to_string());
        if self.fail {
            return Err(anyhow!("mock suggestion failure"));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(responses.remove(0))
        }
    }
}

// =============================================================================
// Mock Trend Source
// =============================================================================

pub struct MockTrendSource {
    topics: Vec<String>,
    fail: bool,
}

impl MockTrendSource {
    pub fn with_topics(topics: Vec<&str>) -> Self {
        Self {
            topics: topics.into_iter().map(|t| t.to_string()).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            topics: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl BaseTrendSource for MockTrendSource {
    async fn trending(&self) -> Result<Vec<String>> {
        if self.fail {
            return Err(anyhow!("mock trends failure"));
        }
        Ok(self.topics.clone())
    }
}

// =============================================================================
// Mock Writer
// =============================================================================

pub struct MockWriter {
    outlines: Arc<Mutex<Vec<ArticleOutline>>>,
    drafts: Arc<Mutex<Vec<ArticleDraft>>>,
    outline_calls: Arc<Mutex<Vec<String>>>,
    article_calls: Arc<Mutex<Vec<String>>>,
}

impl MockWriter {
    pub fn new() -> Self {
        Self {
            outlines: Arc::new(Mutex::new(Vec::new())),
            drafts: Arc::new(Mutex::new(Vec::new())),
            outline_calls: Arc::new(Mutex::new(Vec::new())),
            article_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outline(self, outline: ArticleOutline) -> Self {
        self.outlines.lock().unwrap().push(outline);
        self
    }

    pub fn with_draft(self, draft: ArticleDraft) -> Self {
        self.drafts.lock().unwrap().push(draft);
        self
    }

    pub fn outline_calls(&self) -> Vec<String> {
        self.outline_calls.lock().unwrap().clone()
    }

    pub fn article_calls(&self) -> Vec<String> {
        self.article_calls.lock().unwrap().clone()
    }
}

impl Default for MockWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// A well-formed outline a passing pipeline run would see.
pub fn sample_outline(title: &str) -> ArticleOutline {
    ArticleOutline {
        title: title.to_string(),
        meta_description: format!("{title} explained step by step"),
        sections: vec![
            "Eligibility".to_string(),
            "Required documents".to_string(),
            "Application steps".to_string(),
            "Fees and timelines".to_string(),
        ],
        faq_questions: vec!["How long does it take?".to_string()],
    }
}

/// A draft that passes the default quality gate.
pub fn sample_draft(title: &str) -> ArticleDraft {
    let body = "word ".repeat(700);
    let content = format!(
        "<h1>{title}</h1>\
         <h2>Eligibility</h2><p>{body}</p>\
         <h2>Required documents</h2><p>Bring everything listed.</p>\
         <h2>Application steps</h2><p>Apply online.</p>\
         <h2>FAQ</h2><p>Common questions answered.</p>\
         <h2>Sources</h2><p>Official portal.</p>\
         <h2>Disclaimer</h2><p>Not legal advice.</p>"
    );
    ArticleDraft {
        title: title.to_string(),
        meta_description: format!("{title} explained"),
        content,
        word_count: 720,
        headings: vec![
            "Eligibility".to_string(),
            "Required documents".to_string(),
            "Application steps".to_string(),
            "FAQ".to_string(),
            "Sources".to_string(),
            "Disclaimer".to_string(),
        ],
        has_faq: true,
        has_sources: true,
        has_disclaimer: true,
    }
}

#[async_trait]
impl BaseWriter for MockWriter {
    async fn generate_outline(
        &self,
        query: &str,
        _context: Option<&str>,
    ) -> Result<ArticleOutline> {
        self.outline_calls.lock().unwrap().push(query.to_string());
        let mut outlines = self.outlines.lock().unwrap();
        if outlines.is_empty() {
            Ok(sample_outline(query))
        } else {
            Ok(outlines.remove(0))
        }
    }

    async fn generate_article(
        &self,
        query: &str,
        outline: &ArticleOutline,
        _category: Option<&str>,
    ) -> Result<ArticleDraft> {
        self.article_calls.lock().unwrap().push(query.to_string());
        let mut drafts = self.drafts.lock().unwrap();
        if drafts.is_empty() {
            Ok(sample_draft(&outline.title))
        } else {
            Ok(drafts.remove(0))
        }
    }
}

// =============================================================================
// Mock Publisher
// =============================================================================

pub struct MockPublisher {
    created: Arc<Mutex<Vec<PostPayload>>>,
    updated: Arc<Mutex<Vec<(i64, PostPayload)>>>,
    next_id: Arc<Mutex<i64>>,
    fail: bool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            updated: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1_000)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn created_posts(&self) -> Vec<PostPayload> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated_posts(&self) -> Vec<(i64, PostPayload)> {
        self.updated.lock().unwrap().clone()
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BasePublisher for MockPublisher {
    async fn create_post(&self, payload: &PostPayload) -> Result<PublishedPost> {
        if self.fail {
            return Err(anyhow!("mock publish failure"));
        }
        self.created.lock().unwrap().push(payload.clone());
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        Ok(PublishedPost {
            id: *id,
            url: format!("https://example.org/{}", payload.slug),
            status: "publish".to_string(),
        })
    }

    async fn update_post(&self, cms_post_id: i64, payload: &PostPayload) -> Result<PublishedPost> {
        if self.fail {
            return Err(anyhow!("mock update failure"));
        }
        self.updated
            .lock()
            .unwrap()
            .push((cms_post_id, payload.clone()));
        Ok(PublishedPost {
            id: cms_post_id,
            url: format!("https://example.org/{}", payload.slug),
            status: "publish".to_string(),
        })
    }
}
