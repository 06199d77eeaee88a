use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub suggest_base_url: String,
    pub trends_feed_url: Option<String>,
    pub wordpress_base_url: String,
    pub wordpress_username: String,
    pub wordpress_app_password: String,
    pub pipeline: PipelineConfig,
}

/// Tunable pipeline thresholds, all overridable via environment.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Hard ceiling on publications per trailing 24h.
    pub daily_publish_cap: i64,
    /// Max active keywords visited per discovery run.
    pub keywords_per_run: i64,
    /// Delay between suggestion fetches, milliseconds.
    pub discovery_delay_ms: u64,
    /// Delay after each successful publish, milliseconds.
    pub publish_delay_ms: u64,
    /// Publish delay while trust mode is active, milliseconds.
    pub trust_publish_delay_ms: u64,
    /// Stricter operating profile: lower velocity, full admission checks.
    pub trust_mode: bool,
    /// Master switch for the trust admission check.
    pub trust_checks_enabled: bool,
    /// Reject every YMYL query outright.
    pub safe_topics_only: bool,
    /// Risk score at which a query needs human review.
    pub review_threshold: f64,
    /// Minimum H2 sections in a generated article.
    pub min_h2_count: usize,
    /// Minimum words in a generated article.
    pub min_word_count: usize,
    /// Content similarity at which a candidate is a duplicate.
    pub max_content_similarity: f64,
    /// Title similarity at which a topic already exists.
    pub max_title_similarity: f64,
    /// Outline heading overlap at which an outline is a rehash.
    pub max_outline_overlap: f64,
    /// Per-cluster share ceiling in the trailing 24h window.
    pub cluster_share_ceiling: f64,
    /// Regulated/government-topic share ceiling in the window.
    pub regulated_share_ceiling: f64,
    /// Quotas are inactive while the window holds this many posts or fewer.
    pub diversity_ramp_up_floor: usize,
    /// Minimum minutes between publications; 0 disables the cooldown.
    pub publish_cooldown_minutes: i64,
    /// Days after which a published post is due for refresh.
    pub refresh_interval_days: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            daily_publish_cap: 8,
            keywords_per_run: 20,
            discovery_delay_ms: 1_500,
            publish_delay_ms: 30_000,
            trust_publish_delay_ms: 120_000,
            trust_mode: false,
            trust_checks_enabled: true,
            safe_topics_only: false,
            review_threshold: 0.6,
            min_h2_count: 3,
            min_word_count: 600,
            max_content_similarity: 0.6,
            max_title_similarity: 0.7,
            max_outline_overlap: 0.6,
            cluster_share_ceiling: 0.2,
            regulated_share_ceiling: 0.3,
            diversity_ramp_up_floor: 5,
            publish_cooldown_minutes: 60,
            refresh_interval_days: 90,
        }
    }
}

impl PipelineConfig {
    /// Load thresholds from environment, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            daily_publish_cap: env_parse("DAILY_PUBLISH_CAP", d.daily_publish_cap),
            keywords_per_run: env_parse("KEYWORDS_PER_RUN", d.keywords_per_run),
            discovery_delay_ms: env_parse("DISCOVERY_DELAY_MS", d.discovery_delay_ms),
            publish_delay_ms: env_parse("PUBLISH_DELAY_MS", d.publish_delay_ms),
            trust_publish_delay_ms: env_parse("TRUST_PUBLISH_DELAY_MS", d.trust_publish_delay_ms),
            trust_mode: env_parse("TRUST_MODE", d.trust_mode),
            trust_checks_enabled: env_parse("TRUST_CHECKS_ENABLED", d.trust_checks_enabled),
            safe_topics_only: env_parse("SAFE_TOPICS_ONLY", d.safe_topics_only),
            review_threshold: env_parse("REVIEW_THRESHOLD", d.review_threshold),
            min_h2_count: env_parse("MIN_H2_COUNT", d.min_h2_count),
            min_word_count: env_parse("MIN_WORD_COUNT", d.min_word_count),
            max_content_similarity: env_parse("MAX_CONTENT_SIMILARITY", d.max_content_similarity),
            max_title_similarity: env_parse("MAX_TITLE_SIMILARITY", d.max_title_similarity),
            max_outline_overlap: env_parse("MAX_OUTLINE_OVERLAP", d.max_outline_overlap),
            cluster_share_ceiling: env_parse("CLUSTER_SHARE_CEILING", d.cluster_share_ceiling),
            regulated_share_ceiling: env_parse(
                "REGULATED_SHARE_CEILING",
                d.regulated_share_ceiling,
            ),
            diversity_ramp_up_floor: env_parse(
                "DIVERSITY_RAMP_UP_FLOOR",
                d.diversity_ramp_up_floor,
            ),
            publish_cooldown_minutes: env_parse(
                "PUBLISH_COOLDOWN_MINUTES",
                d.publish_cooldown_minutes,
            ),
            refresh_interval_days: env_parse("REFRESH_INTERVAL_DAYS", d.refresh_interval_days),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            suggest_base_url: env::var("SUGGEST_BASE_URL")
                .unwrap_or_else(|_| "https://suggestqueries.google.com".to_string()),
            trends_feed_url: env::var("TRENDS_FEED_URL").ok(),
            wordpress_base_url: env::var("WORDPRESS_BASE_URL")
                .context("WORDPRESS_BASE_URL must be set")?,
            wordpress_username: env::var("WORDPRESS_USERNAME")
                .context("WORDPRESS_USERNAME must be set")?,
            wordpress_app_password: env::var("WORDPRESS_APP_PASSWORD")
                .context("WORDPRESS_APP_PASSWORD must be set")?,
            pipeline: PipelineConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = PipelineConfig::default();
        assert!(config.daily_publish_cap > 0);
        assert!(config.cluster_share_ceiling < config.regulated_share_ceiling);
        assert!(config.review_threshold > 0.0 && config.review_threshold < 1.0);
        assert!(config.trust_publish_delay_ms > config.publish_delay_ms);
    }
}
