//! Safety classifier - YMYL categorization and hard-block screening.
//!
//! Pure and deterministic: the same query text always yields the same
//! classification. Lexicons are plain keyword lists; blocked topics are
//! substring phrases checked before anything else.

use crate::common::utils::text::normalize;
use crate::domains::queries::models::query::{QueryStatus, YmylCategory};

/// Policy knobs for the classifier.
#[derive(Debug, Clone)]
pub struct SafetyPolicy {
    /// Reject every YMYL query outright.
    pub safe_topics_only: bool,
    /// Risk score at which a query needs human review.
    pub review_threshold: f64,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            safe_topics_only: false,
            review_threshold: 0.6,
        }
    }
}

/// Outcome of classifying one query text.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub is_ymyl: bool,
    pub category: YmylCategory,
    pub risk: f64,
    pub status: QueryStatus,
    pub is_blocked: bool,
}

impl Classification {
    /// Not blocked and not rejected - safe to enter the pipeline.
    pub fn is_safe_to_process(&self) -> bool {
        !self.is_blocked && self.status != QueryStatus::Rejected
    }
}

const RISK_PER_HIT: f64 = 0.3;

/// Declared tie-break order for lexicon categories.
const CATEGORY_ORDER: [YmylCategory; 4] = [
    YmylCategory::Health,
    YmylCategory::Finance,
    YmylCategory::Legal,
    YmylCategory::Safety,
];

pub struct SafetyClassifier {
    policy: SafetyPolicy,
    health: Vec<&'static str>,
    finance: Vec<&'static str>,
    legal: Vec<&'static str>,
    safety: Vec<&'static str>,
    blocked_topics: Vec<&'static str>,
}

impl SafetyClassifier {
    pub fn new(policy: SafetyPolicy) -> Self {
        Self {
            policy,
            health: vec![
                "symptom", "treatment", "medicine", "dosage", "disease", "diagnosis", "cure",
                "vaccine", "surgery", "side effects", "prescription", "therapy",
            ],
            finance: vec![
                "loan", "investment", "tax", "insurance", "mortgage", "credit", "pension",
                "stocks", "mutual fund", "interest rate", "refund", "salary",
            ],
            legal: vec![
                "lawsuit", "court", "legal", "divorce", "custody", "bail", "arrest", "contract",
                "rights", "visa status", "immigration", "fir",
            ],
            safety: vec![
                "emergency", "poison", "accident", "fire safety", "electrical", "recall",
                "hazard", "toxic", "overdose", "helpline",
            ],
            blocked_topics: vec![
                "how to make a weapon",
                "how to make a bomb",
                "buy guns",
                "suicide method",
                "self harm",
                "illegal drugs",
                "hack into",
                "counterfeit",
            ],
        }
    }

    fn lexicon(&self, category: YmylCategory) -> &[&'static str] {
        match category {
            YmylCategory::Health => &self.health,
            YmylCategory::Finance => &self.finance,
            YmylCategory::Legal => &self.legal,
            YmylCategory::Safety => &self.safety,
            YmylCategory::None => &[],
        }
    }

    /// Classify a query text. Blocked phrases short-circuit everything.
    pub fn classify(&self, text: &str) -> Classification {
        let normalized = normalize(text);

        if self
            .blocked_topics
            .iter()
            .any(|phrase| normalized.contains(phrase))
        {
            return Classification {
                is_ymyl: true,
                category: YmylCategory::Safety,
                risk: 1.0,
                status: QueryStatus::Rejected,
                is_blocked: true,
            };
        }

        let mut best_category = YmylCategory::None;
        let mut best_count = 0usize;
        for category in CATEGORY_ORDER {
            let count = self
                .lexicon(category)
                .iter()
                .filter(|term| normalized.contains(*term))
                .count();
            // Strict > keeps the declared order as the tie-break.
            if count > best_count {
                best_count = count;
                best_category = category;
            }
        }

        let is_ymyl = best_count > 0;
        let risk = (best_count as f64 * RISK_PER_HIT).min(1.0);

        let status = if self.policy.safe_topics_only && is_ymyl {
            QueryStatus::Rejected
        } else if risk >= self.policy.review_threshold {
            QueryStatus::ReviewRequired
        } else {
            QueryStatus::Pending
        };

        Classification {
            is_ymyl,
            category: best_category,
            risk,
            status,
            is_blocked: false,
        }
    }
}

impl Default for SafetyClassifier {
    fn default() -> Self {
        Self::new(SafetyPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SafetyClassifier {
        SafetyClassifier::default()
    }

    #[test]
    fn plain_query_is_not_ymyl() {
        let result = classifier().classify("how to renew passport");
        assert!(!result.is_ymyl);
        assert_eq!(result.category, YmylCategory::None);
        assert_eq!(result.risk, 0.0);
        assert_eq!(result.status, QueryStatus::Pending);
        assert!(result.is_safe_to_process());
    }

    #[test]
    fn blocked_phrase_rejects_regardless_of_content() {
        let result = classifier().classify("best guide on how to make a bomb safely");
        assert!(result.is_blocked);
        assert_eq!(result.status, QueryStatus::Rejected);
        assert_eq!(result.category, YmylCategory::Safety);
        assert_eq!(result.risk, 1.0);
        assert!(!result.is_safe_to_process());
    }

    #[test]
    fn hyphenated_blocked_phrase_still_rejects() {
        let result = classifier().classify("coping with self-harm urges");
        assert!(result.is_blocked);
        assert_eq!(result.status, QueryStatus::Rejected);
    }

    #[test]
    fn single_lexicon_hit_flags_ymyl_with_low_risk() {
        let result = classifier().classify("home loan documents checklist");
        assert!(result.is_ymyl);
        assert_eq!(result.category, YmylCategory::Finance);
        assert!((result.risk - 0.3).abs() < 1e-9);
        assert_eq!(result.status, QueryStatus::Pending);
    }

    #[test]
    fn multiple_hits_escalate_to_review() {
        let result = classifier().classify("loan tax insurance comparison");
        assert_eq!(result.category, YmylCategory::Finance);
        assert!(result.risk >= 0.6);
        assert_eq!(result.status, QueryStatus::ReviewRequired);
    }

    #[test]
    fn risk_caps_at_one() {
        let result = classifier().classify("loan tax insurance mortgage credit pension refund");
        assert_eq!(result.risk, 1.0);
    }

    #[test]
    fn ties_break_in_declared_category_order() {
        // One health hit and one finance hit: health is declared first.
        let result = classifier().classify("vaccine refund policy");
        assert_eq!(result.category, YmylCategory::Health);
    }

    #[test]
    fn safe_topics_only_rejects_any_ymyl() {
        let strict = SafetyClassifier::new(SafetyPolicy {
            safe_topics_only: true,
            review_threshold: 0.6,
        });
        let result = strict.classify("home loan documents checklist");
        assert_eq!(result.status, QueryStatus::Rejected);
        assert!(!result.is_safe_to_process());
    }

    #[test]
    fn classification_is_deterministic() {
        let c = classifier();
        assert_eq!(
            c.classify("vaccine side effects"),
            c.classify("vaccine side effects")
        );
    }
}
