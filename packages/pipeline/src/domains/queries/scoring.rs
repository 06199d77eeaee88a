//! Query scorer - pure heuristics turning a query text into value scores.
//!
//! Rule tables are data, not code: each group is a predicate regex with a
//! fixed weight, injectable at construction so tests can swap tables without
//! touching the algorithm.

use regex::Regex;

use crate::common::utils::text::{normalize, round2};
use crate::domains::queries::models::query::{Query, QueryStatus};

/// One scoring rule: a predicate pattern and the score it carries.
#[derive(Debug, Clone)]
pub struct ScoreRule {
    pub pattern: Regex,
    pub score: f64,
}

impl ScoreRule {
    fn new(pattern: &str, score: f64) -> Self {
        Self {
            // Table patterns are compiled from literals; a bad pattern is a
            // programming error, caught by the table tests.
            pattern: Regex::new(pattern).unwrap_or_else(|_| Regex::new("$^").unwrap()),
            score,
        }
    }
}

/// Scores query texts for searcher intent and evergreen value.
pub struct QueryScorer {
    intent_rules: Vec<ScoreRule>,
    evergreen_rules: Vec<ScoreRule>,
    temporal_markers: Vec<Regex>,
}

const BASE_SCORE: f64 = 0.5;
const TEMPORAL_PENALTY: f64 = 0.2;

impl Default for QueryScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryScorer {
    pub fn new() -> Self {
        Self {
            intent_rules: vec![
                // Process language ("how to renew passport")
                ScoreRule::new(r"^how to\b|\bstep by step\b|\bprocess\b|\bprocedure\b", 0.9),
                // Deadline/date language
                ScoreRule::new(r"\bdeadline\b|\blast date\b|\bdue date\b|\bvalidity\b", 0.85),
                // Eligibility/qualification language
                ScoreRule::new(
                    r"\beligib\w*\b|\bqualif\w*\b|\bwho can\b|\bcan i\b|\bam i\b",
                    0.85,
                ),
                // Question forms
                ScoreRule::new(r"^(what|why|when|where|which|who|how)\b", 0.8),
                // Comparison language
                ScoreRule::new(r"\bvs\b|\bversus\b|\bdifference between\b|\bbest\b", 0.75),
                // Definition language
                ScoreRule::new(r"^what is\b|\bmeaning of\b|\bdefinition\b", 0.7),
            ],
            evergreen_rules: vec![
                // Rules/policy topics age slowly
                ScoreRule::new(
                    r"\brules\b|\brequirements\b|\bpolicy\b|\bregulations\b|\bdocuments required\b",
                    0.9,
                ),
                // How-to/guide content
                ScoreRule::new(r"^how to\b|\bguide\b|\bsteps\b|\btutorial\b", 0.85),
                // General explainers
                ScoreRule::new(r"^what is\b|\bmeaning\b|\bbenefits of\b|\bexplained\b", 0.8),
            ],
            temporal_markers: vec![
                Regex::new(r"\b(19|20)\d{2}\b").unwrap(),
                Regex::new(r"\btoday\b|\btonight\b|\bthis week\b|\bthis month\b").unwrap(),
                Regex::new(r"\bbreaking\b|\blatest news\b|\bjust announced\b|\blive updates\b")
                    .unwrap(),
            ],
        }
    }

    /// Construct with custom rule tables.
    pub fn with_rules(
        intent_rules: Vec<ScoreRule>,
        evergreen_rules: Vec<ScoreRule>,
        temporal_markers: Vec<Regex>,
    ) -> Self {
        Self {
            intent_rules,
            evergreen_rules,
            temporal_markers,
        }
    }

    /// Highest matched intent-group score, or the 0.5 base when nothing
    /// matches. Each group fires at most once; ties take the higher score.
    pub fn intent_score(&self, text: &str) -> f64 {
        let normalized = normalize(text);
        self.intent_rules
            .iter()
            .filter(|rule| rule.pattern.is_match(&normalized))
            .map(|rule| rule.score)
            .fold(BASE_SCORE, f64::max)
    }

    /// Evergreen score: base 0.5, raised to the best matched evergreen
    /// group, minus 0.2 per temporal marker, clamped to [0, 1].
    pub fn evergreen_score(&self, text: &str) -> f64 {
        let normalized = normalize(text);

        let raised = self
            .evergreen_rules
            .iter()
            .filter(|rule| rule.pattern.is_match(&normalized))
            .map(|rule| rule.score)
            .fold(BASE_SCORE, f64::max);

        let penalty = self
            .temporal_markers
            .iter()
            .filter(|marker| marker.is_match(&normalized))
            .count() as f64
            * TEMPORAL_PENALTY;

        (raised - penalty).clamp(0.0, 1.0)
    }

    /// Weighted blend: 40% intent, 40% evergreen, 20% inverse risk.
    pub fn combined_score(&self, intent: f64, evergreen: f64, ymyl_risk: f64) -> f64 {
        round2(0.4 * intent + 0.4 * evergreen + 0.2 * (1.0 - ymyl_risk))
    }

    /// Score a query text end to end given its classified risk.
    pub fn score(&self, text: &str, ymyl_risk: f64) -> QueryScores {
        let intent = self.intent_score(text);
        let evergreen = self.evergreen_score(text);
        QueryScores {
            intent,
            evergreen,
            combined: self.combined_score(intent, evergreen, ymyl_risk),
        }
    }
}

/// The three scores assigned at discovery time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryScores {
    pub intent: f64,
    pub evergreen: f64,
    pub combined: f64,
}

/// Sort queries by combined score, best first.
pub fn rank_queries(queries: &mut [Query]) {
    queries.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Pending/approved queries ranked and truncated to a limit.
pub fn publishable_queries(queries: Vec<Query>, limit: usize) -> Vec<Query> {
    let mut eligible: Vec<Query> = queries
        .into_iter()
        .filter(|q| matches!(q.status, QueryStatus::Pending | QueryStatus::Approved))
        .collect();
    rank_queries(&mut eligible);
    eligible.truncate(limit);
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> QueryScorer {
        QueryScorer::new()
    }

    fn query_with(status: QueryStatus, combined: f64) -> Query {
        Query::builder()
            .query(format!("query {combined}"))
            .normalized_query(format!("query {combined}"))
            .intent_score(0.5)
            .evergreen_score(0.5)
            .ymyl_risk(0.0)
            .combined_score(combined)
            .status(status)
            .build()
    }

    #[test]
    fn how_to_queries_score_high_intent() {
        assert!(scorer().intent_score("how to renew passport") >= 0.85);
    }

    #[test]
    fn unmatched_text_gets_base_intent() {
        assert_eq!(scorer().intent_score("random assorted words"), 0.5);
    }

    #[test]
    fn eligibility_language_beats_plain_questions() {
        let s = scorer();
        assert!(s.intent_score("who can apply for eligibility") > s.intent_score("where is delhi"));
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let s = scorer();
        for text in [
            "how to renew passport 2019 today breaking news this week",
            "breaking latest news just announced 2021 2022 today",
            "passport renewal rules and requirements guide",
            "",
        ] {
            let intent = s.intent_score(text);
            let evergreen = s.evergreen_score(text);
            let combined = s.combined_score(intent, evergreen, 0.5);
            assert!((0.0..=1.0).contains(&intent), "intent for {text:?}");
            assert!((0.0..=1.0).contains(&evergreen), "evergreen for {text:?}");
            assert!((0.0..=1.0).contains(&combined), "combined for {text:?}");
        }
    }

    #[test]
    fn temporal_markers_penalize_evergreen() {
        let s = scorer();
        let stable = s.evergreen_score("passport renewal rules");
        let dated = s.evergreen_score("passport renewal rules 2024");
        assert!(dated < stable);
        assert!((stable - dated - 0.2).abs() < 1e-9);
    }

    #[test]
    fn evergreen_clamps_at_zero() {
        // Three markers on an unraised base: 0.5 - 0.6 clamps to 0.
        let score = scorer().evergreen_score("breaking news today 2024");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn perfect_inputs_combine_to_one() {
        assert_eq!(scorer().combined_score(1.0, 1.0, 0.0), 1.0);
    }

    #[test]
    fn risk_strictly_decreases_combined() {
        let s = scorer();
        let low = s.combined_score(0.8, 0.8, 0.1);
        let high = s.combined_score(0.8, 0.8, 0.9);
        assert!(high < low);
    }

    #[test]
    fn scoring_is_deterministic() {
        let s = scorer();
        let a = s.score("how to renew passport", 0.3);
        let b = s.score("how to renew passport", 0.3);
        assert_eq!(a, b);
    }

    #[test]
    fn rank_orders_descending() {
        let mut queries = vec![
            query_with(QueryStatus::Pending, 0.4),
            query_with(QueryStatus::Pending, 0.9),
            query_with(QueryStatus::Pending, 0.7),
        ];
        rank_queries(&mut queries);
        assert_eq!(queries[0].combined_score, 0.9);
        assert_eq!(queries[2].combined_score, 0.4);
    }

    #[test]
    fn publishable_filters_status_and_truncates() {
        let queries = vec![
            query_with(QueryStatus::Rejected, 0.95),
            query_with(QueryStatus::Pending, 0.8),
            query_with(QueryStatus::Approved, 0.9),
            query_with(QueryStatus::Published, 0.99),
            query_with(QueryStatus::Pending, 0.6),
        ];
        let publishable = publishable_queries(queries, 2);
        assert_eq!(publishable.len(), 2);
        assert_eq!(publishable[0].combined_score, 0.9);
        assert_eq!(publishable[1].combined_score, 0.8);
    }

    #[test]
    fn custom_rule_tables_are_honored() {
        let scorer = QueryScorer::with_rules(
            vec![ScoreRule::new(r"\bzebra\b", 0.99)],
            vec![],
            vec![],
        );
        assert_eq!(scorer.intent_score("zebra crossing rules"), 0.99);
        assert_eq!(scorer.intent_score("how to renew passport"), 0.5);
    }
}
