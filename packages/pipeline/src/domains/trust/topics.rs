//! Canonical topic keys.
//!
//! A topic collapses to a (process noun, action verb, location) tuple drawn
//! from fixed vocabularies. Two queries collide iff their keys are identical;
//! this is the primary hard-dedup signal.

use crate::common::utils::text::normalize;

/// Process nouns in priority order. First match wins.
const PROCESS_NOUNS: &[&str] = &[
    "passport",
    "visa",
    "license",
    "licence",
    "permit",
    "certificate",
    "registration",
    "pension",
    "scholarship",
    "insurance",
    "loan",
    "tax",
];

/// Nouns that name government or otherwise regulated processes.
const REGULATED_NOUNS: &[&str] = &[
    "passport",
    "visa",
    "license",
    "licence",
    "permit",
    "certificate",
    "registration",
    "pension",
    "tax",
];

/// Action verbs: canonical form plus surface variants, in priority order.
const ACTIONS: &[(&str, &[&str])] = &[
    ("renew", &["renew", "renews", "renewal", "renewing", "renewed"]),
    ("apply", &["apply", "applying", "application", "applications"]),
    ("get", &["get", "getting", "obtain", "obtaining"]),
    ("register", &["register", "registering"]),
    ("check", &["check", "checking", "verify", "verification"]),
    ("update", &["update", "updating", "change", "changing"]),
    ("extend", &["extend", "extension", "extending"]),
    ("cancel", &["cancel", "cancellation", "cancelling"]),
    ("track", &["track", "tracking", "status"]),
    ("download", &["download", "downloading"]),
];

/// Country tokens recognized as locations.
const LOCATIONS: &[&str] = &[
    "india",
    "usa",
    "uk",
    "canada",
    "australia",
    "japan",
    "germany",
    "france",
    "singapore",
    "uae",
    "ireland",
    "nepal",
];

/// A normalized word matches a noun exactly or as a simple plural.
fn word_matches(word: &str, vocab: &str) -> bool {
    word == vocab || word.strip_suffix('s') == Some(vocab)
}

/// Extract the canonical topic key of a query or title.
///
/// Joins present (noun, action, location) parts with `-`; when none of the
/// vocabularies match, falls back to the first three normalized words.
pub fn canonical_topic_key(text: &str) -> String {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized.split_whitespace().collect();

    // "licence" canonicalizes to "license" so spelling never splits a topic.
    let noun = PROCESS_NOUNS
        .iter()
        .find(|n| words.iter().any(|w| word_matches(w, n)))
        .map(|n| if *n == "licence" { "license" } else { *n });

    let action = ACTIONS
        .iter()
        .find(|(_, variants)| words.iter().any(|w| variants.contains(w)))
        .map(|(canonical, _)| *canonical);

    let location = LOCATIONS
        .iter()
        .find(|l| words.contains(*l))
        .copied();

    let parts: Vec<&str> = [noun, action, location].into_iter().flatten().collect();

    if parts.is_empty() {
        words.into_iter().take(3).collect::<Vec<_>>().join("-")
    } else {
        parts.join("-")
    }
}

/// Whether a query or title names a government/regulated process.
pub fn is_regulated_topic(text: &str) -> bool {
    let normalized = normalize(text);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    REGULATED_NOUNS
        .iter()
        .any(|n| words.iter().any(|w| word_matches(w, n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_order_does_not_change_the_key() {
        assert_eq!(
            canonical_topic_key("renew passport india"),
            canonical_topic_key("passport renewal india")
        );
    }

    #[test]
    fn different_topics_get_different_keys() {
        assert_ne!(
            canonical_topic_key("renew passport india"),
            canonical_topic_key("apply visa japan")
        );
    }

    #[test]
    fn key_is_noun_action_location() {
        assert_eq!(canonical_topic_key("how to renew passport in india"), "passport-renew-india");
        assert_eq!(canonical_topic_key("apply for a visa to japan"), "visa-apply-japan");
    }

    #[test]
    fn spelling_variants_collapse() {
        assert_eq!(
            canonical_topic_key("driving licence renewal uk"),
            canonical_topic_key("driving license renewal uk")
        );
    }

    #[test]
    fn unmatched_text_falls_back_to_first_three_words() {
        assert_eq!(
            canonical_topic_key("best hiking trails near mountains"),
            "best-hiking-trails"
        );
    }

    #[test]
    fn short_unmatched_text_uses_what_exists() {
        assert_eq!(canonical_topic_key("hello world"), "hello-world");
    }

    #[test]
    fn regulated_topics_are_detected() {
        assert!(is_regulated_topic("how to renew passport in india"));
        assert!(is_regulated_topic("income tax refund status"));
        assert!(!is_regulated_topic("best hiking trails near mountains"));
    }
}
