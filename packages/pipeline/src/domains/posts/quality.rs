//! Quality gate - structural checks on generated articles.
//!
//! Seven checks, one point each: H1 present, enough H2 sections, FAQ marker,
//! sources marker, disclaimer marker, word count, and no banned phrases.
//! Banned-phrase hits are issues AND tracked separately, so `score` and
//! `passed` can diverge; `passed` is authoritative.

use lazy_static::lazy_static;
use scraper::{Html, Selector};

use crate::common::utils::text::{content_tokens, jaccard, shingles};

lazy_static! {
    static ref H1_SELECTOR: Selector = Selector::parse("h1").unwrap();
    static ref H2_SELECTOR: Selector = Selector::parse("h2").unwrap();
    static ref H3_SELECTOR: Selector = Selector::parse("h3").unwrap();
}

const CHECK_COUNT: usize = 7;

/// Phrases that mark machine-sounding or placeholder copy.
const DEFAULT_BANNED_PHRASES: &[&str] = &[
    "as an ai language model",
    "as an ai",
    "i cannot provide",
    "lorem ipsum",
    "in conclusion, it is important to note",
    "it's important to note that",
];

/// Result of running the gate over one article.
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub passed: bool,
    /// Fraction of the 7-point scale earned; banned-phrase hits are added
    /// back here because they are tracked in `banned_phrases_found`.
    pub score: f64,
    pub issues: Vec<String>,
    pub banned_phrases_found: Vec<String>,
    pub h1_count: usize,
    pub h2_count: usize,
}

pub struct QualityGate {
    min_h2_count: usize,
    min_word_count: usize,
    banned_phrases: Vec<String>,
}

impl QualityGate {
    pub fn new(min_h2_count: usize, min_word_count: usize) -> Self {
        Self {
            min_h2_count,
            min_word_count,
            banned_phrases: DEFAULT_BANNED_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    pub fn with_banned_phrases(mut self, phrases: Vec<String>) -> Self {
        self.banned_phrases = phrases;
        self
    }

    /// Run all checks over an article's HTML content and declared word count.
    pub fn check(&self, content: &str, word_count: usize) -> QualityReport {
        let document = Html::parse_fragment(content);
        let lowercase = content.to_lowercase();

        let h1_count = document.select(&H1_SELECTOR).count();
        let h2_count = document.select(&H2_SELECTOR).count();

        let mut issues = Vec::new();

        if h1_count == 0 {
            issues.push("Missing H1 heading".to_string());
        }
        if h2_count < self.min_h2_count {
            issues.push(format!(
                "Insufficient H2 sections (found {}, need {})",
                h2_count, self.min_h2_count
            ));
        }
        if !lowercase.contains("faq") && !lowercase.contains("frequently asked") {
            issues.push("Missing FAQ section".to_string());
        }
        if !lowercase.contains("sources") {
            issues.push("Missing Sources section".to_string());
        }
        if !lowercase.contains("disclaimer") {
            issues.push("Missing Disclaimer section".to_string());
        }
        if word_count < self.min_word_count {
            issues.push(format!(
                "Insufficient word count ({} < {})",
                word_count, self.min_word_count
            ));
        }

        let mut banned_phrases_found = Vec::new();
        for phrase in &self.banned_phrases {
            if lowercase.contains(phrase.as_str()) {
                banned_phrases_found.push(phrase.clone());
                issues.push(format!("Contains banned phrase: \"{phrase}\""));
            }
        }

        let score = (CHECK_COUNT as f64 - issues.len() as f64 + banned_phrases_found.len() as f64)
            / CHECK_COUNT as f64;

        QualityReport {
            passed: issues.is_empty(),
            score,
            issues,
            banned_phrases_found,
            h1_count,
            h2_count,
        }
    }
}

/// Count H2 plus H3 headings, for the persisted heading count.
pub fn heading_count(content: &str) -> usize {
    let document = Html::parse_fragment(content);
    document.select(&H2_SELECTOR).count() + document.select(&H3_SELECTOR).count()
}

/// Jaccard similarity of two HTML contents over 3-word shingles.
///
/// Symmetric; 1 for identical non-trivial content; 0 when either side is too
/// short to shingle.
pub fn calculate_similarity(a: &str, b: &str) -> f64 {
    let shingles_a = shingles(&content_tokens(a));
    let shingles_b = shingles(&content_tokens(b));
    jaccard(&shingles_a, &shingles_b)
}

/// Result of scanning a candidate against prior contents.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicationCheck {
    pub is_duplicate: bool,
    /// Highest similarity observed before the scan stopped. Because the scan
    /// short-circuits on the first violation, this is not necessarily the
    /// global maximum.
    pub max_similarity: f64,
}

/// Scan prior contents in order, stopping at the first one whose similarity
/// reaches the ceiling.
pub fn check_duplication(candidate: &str, priors: &[String], ceiling: f64) -> DuplicationCheck {
    let candidate_shingles = shingles(&content_tokens(candidate));
    let mut max_similarity: f64 = 0.0;

    for prior in priors {
        let prior_shingles = shingles(&content_tokens(prior));
        let similarity = jaccard(&candidate_shingles, &prior_shingles);
        max_similarity = max_similarity.max(similarity);
        if similarity >= ceiling {
            return DuplicationCheck {
                is_duplicate: true,
                max_similarity,
            };
        }
    }

    DuplicationCheck {
        is_duplicate: false,
        max_similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> QualityGate {
        QualityGate::new(3, 600)
    }

    fn good_article() -> String {
        let body = "word ".repeat(650);
        format!(
            "<h1>Passport Renewal</h1>\
             <h2>Eligibility</h2><p>{body}</p>\
             <h2>Steps</h2><p>Apply online.</p>\
             <h2>FAQ</h2><p>Answers.</p>\
             <h2>Sources</h2><p>Official portal.</p>\
             <h2>Disclaimer</h2><p>Not legal advice.</p>"
        )
    }

    #[test]
    fn well_formed_article_passes() {
        let report = gate().check(&good_article(), 650);
        assert!(report.passed, "issues: {:?}", report.issues);
        assert_eq!(report.score, 1.0);
        assert!(report.banned_phrases_found.is_empty());
    }

    #[test]
    fn bare_article_fails_with_exact_issue_set() {
        let content = "<h2>One</h2><h2>Two</h2><p>thin text</p>";
        let report = gate().check(content, 100);

        assert!(!report.passed);
        assert_eq!(report.issues.len(), 6);
        assert!(report.issues.iter().any(|i| i.contains("Missing H1")));
        assert!(report.issues.iter().any(|i| i.contains("Insufficient H2")));
        assert!(report.issues.iter().any(|i| i.contains("Missing FAQ")));
        assert!(report.issues.iter().any(|i| i.contains("Missing Sources")));
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("Missing Disclaimer")));
        assert!(report
            .issues
            .iter()
            .any(|i| i.contains("Insufficient word count")));
    }

    #[test]
    fn banned_phrase_fails_but_score_diverges() {
        let content = good_article().replace(
            "Apply online.",
            "As an AI language model, apply online.",
        );
        let report = gate().check(&content, 650);

        assert!(!report.passed);
        assert!(!report.banned_phrases_found.is_empty());
        // Banned hits are added back into score, so score stays high while
        // passed is false.
        assert_eq!(report.score, 1.0);
    }

    #[test]
    fn identical_content_similarity_is_one() {
        let content = good_article();
        assert_eq!(calculate_similarity(&content, &content), 1.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = "renewing a passport requires a valid identity document and proof of address";
        let b = "renewing a passport requires filling the online form and paying the fee";
        assert_eq!(calculate_similarity(a, b), calculate_similarity(b, a));
    }

    #[test]
    fn unrelated_content_similarity_is_low() {
        let a = "renewing a passport requires a valid identity document and proof of address";
        let b = "growing tomatoes indoors needs consistent light and careful watering schedules";
        assert!(calculate_similarity(a, b) < 0.1);
    }

    #[test]
    fn empty_content_similarity_is_zero() {
        assert_eq!(calculate_similarity("", "some real content here with words"), 0.0);
    }

    #[test]
    fn duplication_short_circuits_on_first_violation() {
        let candidate = "renewing a passport requires a valid identity document and proof".to_string();
        let near_copy = candidate.clone();
        let unrelated = "growing tomatoes indoors needs consistent light levels".to_string();

        let check = check_duplication(&candidate, &[near_copy, unrelated], 0.9);
        assert!(check.is_duplicate);
        assert_eq!(check.max_similarity, 1.0);
    }

    #[test]
    fn duplication_reports_max_when_clean() {
        let candidate = "renewing a passport requires a valid identity document and proof";
        let priors = vec![
            "growing tomatoes indoors needs consistent light levels".to_string(),
            "renewing a passport requires a valid travel history and proof".to_string(),
        ];
        let check = check_duplication(candidate, &priors, 0.99);
        assert!(!check.is_duplicate);
        assert!(check.max_similarity > 0.0);
        assert!(check.max_similarity < 0.99);
    }

    #[test]
    fn heading_count_includes_h3() {
        let content = "<h2>A</h2><h3>A.1</h3><h2>B</h2>";
        assert_eq!(heading_count(content), 3);
    }
}
