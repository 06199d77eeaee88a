use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ArticleDraft, ArticleOutline, BaseWriter};

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Generative-text client speaking the OpenAI chat-completions protocol.
///
/// Both calls request strict JSON output and deserialize the assistant
/// message into the outline/draft contract types.
pub struct WriterClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Wire shape the article prompt asks the model to produce.
#[derive(Debug, Deserialize)]
struct ArticleWire {
    title: String,
    meta_description: String,
    content: String,
    word_count: usize,
    headings: Vec<String>,
    has_faq: bool,
    has_sources: bool,
    has_disclaimer: bool,
}

impl WriterClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(180))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    async fn complete_json(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
            temperature: 0.6,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Writer request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Writer API returned {}", response.status()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("Writer response was not valid JSON")?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("Writer response had no choices"))
    }
}

#[async_trait]
impl BaseWriter for WriterClient {
    async fn generate_outline(
        &self,
        query: &str,
        context: Option<&str>,
    ) -> Result<ArticleOutline> {
        let system = "You are an editorial planner for an evergreen reference site. \
                      Respond with a JSON object: {\"title\", \"meta_description\", \
                      \"sections\" (array of H2 headings), \"faq_questions\" (array)}.";
        let user = match context {
            Some(ctx) => format!("Plan an article answering: {query}\nContext: {ctx}"),
            None => format!("Plan an article answering: {query}"),
        };

        let raw = self.complete_json(system, &user).await?;
        serde_json::from_str(&raw).context("Outline JSON did not match contract")
    }

    async fn generate_article(
        &self,
        query: &str,
        outline: &ArticleOutline,
        category: Option<&str>,
    ) -> Result<ArticleDraft> {
        let system = "You write thorough, sourced evergreen articles in clean HTML. \
                      Respond with a JSON object: {\"title\", \"meta_description\", \
                      \"content\" (HTML with one h1, h2 sections, an FAQ section, a \
                      Sources section, and a Disclaimer), \"word_count\", \"headings\" \
                      (array of h2/h3 texts), \"has_faq\", \"has_sources\", \
                      \"has_disclaimer\"}.";
        let user = format!(
            "Query: {query}\nCategory: {}\nOutline: {}",
            category.unwrap_or("general"),
            serde_json::to_string(outline)?
        );

        let raw = self.complete_json(system, &user).await?;
        let wire: ArticleWire =
            serde_json::from_str(&raw).context("Article JSON did not match contract")?;

        Ok(ArticleDraft {
            title: wire.title,
            meta_description: wire.meta_description,
            content: wire.content,
            word_count: wire.word_count,
            headings: wire.headings,
            has_faq: wire.has_faq,
            has_sources: wire.has_sources,
            has_disclaimer: wire.has_disclaimer,
        })
    }
}
