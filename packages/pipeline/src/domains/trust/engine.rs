//! Trust/dedup engine - publication diversity, pacing, and topic dedup.
//!
//! Every check is pure over caller-supplied history; the orchestrator loads
//! that history from the database and passes it in, which keeps the policy
//! logic testable without a live pool.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};

use crate::common::utils::text::{jaccard, normalize, word_set};

use super::topics::{canonical_topic_key, is_regulated_topic};

/// Thresholds governing the trust checks.
#[derive(Debug, Clone)]
pub struct TrustConfig {
    /// Master switch; disabled means every admission is granted.
    pub enabled: bool,
    /// Title similarity at which a topic already exists.
    pub max_title_similarity: f64,
    /// Outline heading overlap at which an outline is a rehash.
    pub max_outline_overlap: f64,
    /// Per-cluster share ceiling in the trailing window.
    pub cluster_share_ceiling: f64,
    /// Regulated-topic share ceiling in the trailing window.
    pub regulated_share_ceiling: f64,
    /// Quotas stay inactive while the window holds this many posts or fewer.
    pub ramp_up_floor: usize,
    /// Minimum minutes between publications; 0 disables the cooldown.
    pub cooldown_minutes: i64,
    /// Generic title phrases that are never allowed.
    pub banned_title_phrases: Vec<String>,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_title_similarity: 0.7,
            max_outline_overlap: 0.6,
            cluster_share_ceiling: 0.2,
            regulated_share_ceiling: 0.3,
            ramp_up_floor: 5,
            cooldown_minutes: 60,
            banned_title_phrases: vec![
                "ultimate guide".to_string(),
                "complete guide".to_string(),
                "comprehensive guide".to_string(),
                "everything you need to know".to_string(),
                "the only guide you need".to_string(),
            ],
        }
    }
}

/// Aggregate view of the trailing publication window. Recomputed per check,
/// never persisted.
#[derive(Debug, Clone, Default)]
pub struct DiversityStats {
    pub total: usize,
    pub cluster_counts: HashMap<String, usize>,
    pub regulated_count: usize,
    pub categories: HashSet<String>,
}

impl DiversityStats {
    /// Build window stats from the titles and categories published inside it.
    pub fn from_window<'a, I>(titles_and_categories: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut stats = Self::default();
        for (title, category) in titles_and_categories {
            stats.total += 1;
            *stats
                .cluster_counts
                .entry(canonical_topic_key(title))
                .or_insert(0) += 1;
            if is_regulated_topic(title) {
                stats.regulated_count += 1;
            }
            if let Some(category) = category {
                stats.categories.insert(category.to_string());
            }
        }
        stats
    }
}

/// What the engine needs to know about prior publications.
#[derive(Debug, Clone, Default)]
pub struct TrustContext {
    /// Titles of every published post (topic-existence scan).
    pub published_titles: Vec<String>,
    /// Stats over the trailing 24h window.
    pub window: DiversityStats,
    /// Most recent publication time, if any.
    pub last_published_at: Option<DateTime<Utc>>,
}

/// Outcome of the master admission check.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionDecision {
    pub admitted: bool,
    pub reasons: Vec<String>,
}

pub struct TrustEngine {
    config: TrustConfig,
}

impl TrustEngine {
    pub fn new(config: TrustConfig) -> Self {
        Self { config }
    }

    /// Jaccard similarity of two titles over their word sets.
    pub fn title_similarity(&self, a: &str, b: &str) -> f64 {
        jaccard(&word_set(a), &word_set(b))
    }

    /// Whether two titles open with the same four words.
    pub fn has_duplicate_opening(&self, a: &str, b: &str) -> bool {
        let first_four = |text: &str| -> Option<Vec<String>> {
            let normalized = normalize(text);
            let words: Vec<String> = normalized
                .split_whitespace()
                .take(4)
                .map(|w| w.to_string())
                .collect();
            (words.len() == 4).then_some(words)
        };

        matches!((first_four(a), first_four(b)), (Some(x), Some(y)) if x == y)
    }

    /// Reject titles built on banned generic phrases.
    pub fn validate_title(&self, title: &str) -> Result<(), String> {
        let lowercase = title.to_lowercase();
        for phrase in &self.config.banned_title_phrases {
            if lowercase.contains(phrase.as_str()) {
                return Err(format!("title contains banned phrase \"{phrase}\""));
            }
        }
        Ok(())
    }

    /// Diversity quota over the trailing window.
    ///
    /// Quotas are inactive below the ramp-up floor so early operation is not
    /// starved. Shares are prospective: they model the window after this
    /// admission.
    pub fn check_diversity(&self, stats: &DiversityStats, candidate: &str) -> Result<(), String> {
        if stats.total <= self.config.ramp_up_floor {
            return Ok(());
        }

        let prospective_total = (stats.total + 1) as f64;
        let key = canonical_topic_key(candidate);
        let cluster_count = stats.cluster_counts.get(&key).copied().unwrap_or(0);
        let cluster_share = (cluster_count + 1) as f64 / prospective_total;
        if cluster_share >= self.config.cluster_share_ceiling {
            return Err(format!(
                "cluster \"{key}\" would hold {:.0}% of the 24h window (ceiling {:.0}%)",
                cluster_share * 100.0,
                self.config.cluster_share_ceiling * 100.0
            ));
        }

        if is_regulated_topic(candidate) {
            let regulated_share = (stats.regulated_count + 1) as f64 / prospective_total;
            if regulated_share >= self.config.regulated_share_ceiling {
                return Err(format!(
                    "regulated topics would hold {:.0}% of the 24h window (ceiling {:.0}%)",
                    regulated_share * 100.0,
                    self.config.regulated_share_ceiling * 100.0
                ));
            }
        }

        Ok(())
    }

    /// Minimum-interval gate between publications.
    pub fn check_cooldown(&self, last_published_at: Option<DateTime<Utc>>) -> Result<(), String> {
        if self.config.cooldown_minutes <= 0 {
            return Ok(());
        }
        let Some(last) = last_published_at else {
            return Ok(());
        };

        let elapsed = Utc::now() - last;
        let cooldown = Duration::minutes(self.config.cooldown_minutes);
        if elapsed < cooldown {
            return Err(format!(
                "publishing cooldown active ({} of {} minutes elapsed)",
                elapsed.num_minutes(),
                self.config.cooldown_minutes
            ));
        }
        Ok(())
    }

    /// Fraction of the candidate outline already covered by a prior outline.
    pub fn outline_similarity(&self, candidate: &[String], prior: &[String]) -> f64 {
        let candidate_set: HashSet<String> =
            candidate.iter().map(|h| normalize(h)).collect();
        let prior_set: HashSet<String> = prior.iter().map(|h| normalize(h)).collect();
        if candidate_set.is_empty() {
            return 0.0;
        }
        let overlap = candidate_set.intersection(&prior_set).count();
        overlap as f64 / candidate_set.len() as f64
    }

    /// Whether a candidate outline rehashes any prior outline.
    pub fn check_outline(&self, candidate: &[String], priors: &[Vec<String>]) -> Result<(), String> {
        for prior in priors {
            let overlap = self.outline_similarity(candidate, prior);
            if overlap >= self.config.max_outline_overlap {
                return Err(format!(
                    "outline overlaps {:.0}% with an existing article",
                    overlap * 100.0
                ));
            }
        }
        Ok(())
    }

    /// A candidate topic already exists if its canonical key matches any
    /// published title's key, or a published title is too similar. First
    /// match wins.
    pub fn topic_exists(&self, candidate: &str, published_titles: &[String]) -> Option<String> {
        let key = canonical_topic_key(candidate);
        for title in published_titles {
            if canonical_topic_key(title) == key {
                return Some(format!("canonical topic \"{key}\" already published: \"{title}\""));
            }
            let similarity = self.title_similarity(candidate, title);
            if similarity > self.config.max_title_similarity {
                return Some(format!(
                    "title {:.0}% similar to published \"{title}\"",
                    similarity * 100.0
                ));
            }
        }
        None
    }

    /// Master admission check: topic existence, title validation, and the
    /// diversity quota, with every failure reason accumulated. The cooldown
    /// is deliberately not part of the verdict; it gates the publishing
    /// batch as a whole, not any single candidate.
    pub fn check_admission(&self, candidate: &str, context: &TrustContext) -> AdmissionDecision {
        if !self.config.enabled {
            return AdmissionDecision {
                admitted: true,
                reasons: Vec::new(),
            };
        }

        let mut reasons = Vec::new();

        if let Some(reason) = self.topic_exists(candidate, &context.published_titles) {
            reasons.push(reason);
        }
        if let Err(reason) = self.validate_title(candidate) {
            reasons.push(reason);
        }
        if let Err(reason) = self.check_diversity(&context.window, candidate) {
            reasons.push(reason);
        }

        AdmissionDecision {
            admitted: reasons.is_empty(),
            reasons,
        }
    }
}

impl Default for TrustEngine {
    fn default() -> Self {
        Self::new(TrustConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TrustEngine {
        TrustEngine::default()
    }

    fn window_of(titles: &[&str]) -> DiversityStats {
        DiversityStats::from_window(titles.iter().map(|t| (*t, None)))
    }

    #[test]
    fn identical_titles_have_similarity_one() {
        let e = engine();
        assert_eq!(
            e.title_similarity("renew passport online india", "renew passport online india"),
            1.0
        );
    }

    #[test]
    fn duplicate_opening_detected() {
        let e = engine();
        assert!(e.has_duplicate_opening(
            "How to Renew Passport Online",
            "How to renew passport at the counter"
        ));
        assert!(!e.has_duplicate_opening(
            "How to Renew Passport Online",
            "Where to Renew a Passport"
        ));
    }

    #[test]
    fn short_titles_never_match_openings() {
        let e = engine();
        assert!(!e.has_duplicate_opening("Passport help", "Passport help"));
    }

    #[test]
    fn banned_title_phrases_rejected() {
        let e = engine();
        assert!(e.validate_title("The Ultimate Guide to Passports").is_err());
        assert!(e.validate_title("Passport Renewal Explained").is_ok());
    }

    #[test]
    fn quotas_inactive_below_ramp_up_floor() {
        let e = engine();
        let window = window_of(&[
            "renew passport india",
            "renew passport india",
            "renew passport india",
            "renew passport india",
            "renew passport india",
        ]);
        assert_eq!(window.total, 5);
        assert!(e.check_diversity(&window, "renew passport india").is_ok());
    }

    #[test]
    fn saturated_cluster_rejected_above_floor() {
        let e = engine();
        let titles = vec!["renew passport india"; 10];
        let window = window_of(&titles);
        assert!(e.check_diversity(&window, "passport renewal india").is_err());
    }

    #[test]
    fn diverse_window_admits_new_cluster() {
        let e = engine();
        let window = window_of(&[
            "renew passport india",
            "apply visa japan",
            "track pension payment",
            "best hiking trails near mountains",
            "growing tomatoes indoors guide",
            "learn chess openings fast",
            "plan a road trip europe",
            "morning yoga routines explained",
            "sourdough starter maintenance tips",
            "indoor plant care basics",
        ]);
        assert!(e
            .check_diversity(&window, "apply scholarship ireland")
            .is_ok());
    }

    #[test]
    fn regulated_share_ceiling_enforced() {
        let e = engine();
        // 4 of 10 already regulated; a 5th would be 5/11 = 45%.
        let window = window_of(&[
            "renew passport india",
            "apply visa japan",
            "license renewal uk",
            "income tax refund status",
            "best hiking trails near mountains",
            "growing tomatoes indoors guide",
            "learn chess openings fast",
            "plan a road trip europe",
            "morning yoga routines explained",
            "sourdough starter maintenance tips",
        ]);
        assert!(e.check_diversity(&window, "apply permit canada").is_err());
    }

    #[test]
    fn cooldown_blocks_recent_publication() {
        let e = engine();
        let just_now = Some(Utc::now() - Duration::minutes(5));
        assert!(e.check_cooldown(just_now).is_err());
        let long_ago = Some(Utc::now() - Duration::minutes(90));
        assert!(e.check_cooldown(long_ago).is_ok());
        assert!(e.check_cooldown(None).is_ok());
    }

    #[test]
    fn zero_cooldown_disables_the_gate() {
        let e = TrustEngine::new(TrustConfig {
            cooldown_minutes: 0,
            ..TrustConfig::default()
        });
        assert!(e.check_cooldown(Some(Utc::now())).is_ok());
    }

    #[test]
    fn outline_rehash_flagged() {
        let e = engine();
        let candidate = vec![
            "Eligibility".to_string(),
            "Required documents".to_string(),
            "Application steps".to_string(),
        ];
        let prior = vec![
            "Eligibility".to_string(),
            "Required documents".to_string(),
            "Fees".to_string(),
        ];
        assert!(e.check_outline(&candidate, &[prior]).is_err());

        let fresh_prior = vec!["History".to_string(), "Trivia".to_string()];
        assert!(e.check_outline(&candidate, &[fresh_prior]).is_ok());
    }

    #[test]
    fn topic_exists_on_canonical_key_match() {
        let e = engine();
        let published = vec!["Passport Renewal in India".to_string()];
        assert!(e
            .topic_exists("how to renew passport india", &published)
            .is_some());
        assert!(e.topic_exists("apply visa japan", &published).is_none());
    }

    #[test]
    fn master_check_accumulates_reasons() {
        let e = engine();
        let context = TrustContext {
            published_titles: vec!["Passport Renewal in India".to_string()],
            window: DiversityStats::default(),
            last_published_at: Some(Utc::now()),
        };
        let decision =
            e.check_admission("The Ultimate Guide to renew passport india", &context);
        assert!(!decision.admitted);
        assert!(decision.reasons.len() >= 2);
    }

    #[test]
    fn active_cooldown_does_not_reject_a_fresh_candidate() {
        // The cooldown pauses the publishing batch; it must never show up
        // as a per-candidate rejection reason.
        let e = engine();
        let context = TrustContext {
            published_titles: vec!["Passport Renewal in India".to_string()],
            window: DiversityStats::default(),
            last_published_at: Some(Utc::now() - Duration::seconds(30)),
        };
        assert!(e.check_cooldown(context.last_published_at).is_err());

        let decision = e.check_admission("apply for a work visa in japan", &context);
        assert!(decision.admitted, "reasons: {:?}", decision.reasons);
    }

    #[test]
    fn disabled_engine_admits_everything() {
        let e = TrustEngine::new(TrustConfig {
            enabled: false,
            ..TrustConfig::default()
        });
        let context = TrustContext {
            published_titles: vec!["Passport Renewal in India".to_string()],
            window: DiversityStats::default(),
            last_published_at: Some(Utc::now()),
        };
        let decision = e.check_admission("passport renewal india", &context);
        assert!(decision.admitted);
        assert!(decision.reasons.is_empty());
    }
}
