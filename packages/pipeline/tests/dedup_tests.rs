//! Duplicate detection behavior across the hash, similarity, and topic-key
//! layers.

use pipeline_core::common::utils::generate_content_hash;
use pipeline_core::domains::posts::quality::{calculate_similarity, check_duplication};
use pipeline_core::domains::trust::{canonical_topic_key, is_regulated_topic};

#[test]
fn markup_and_case_do_not_change_the_hash() {
    let plain = "Renew your passport before the deadline.";
    let marked_up = "<p>Renew your <strong>passport</strong> before the deadline.</p>";

    assert_eq!(generate_content_hash(plain), generate_content_hash(marked_up));
    assert_eq!(
        generate_content_hash(plain),
        generate_content_hash("RENEW YOUR PASSPORT   BEFORE THE DEADLINE.")
    );
}

#[test]
fn different_content_hashes_differently() {
    assert_ne!(
        generate_content_hash("Renew your passport before the deadline."),
        generate_content_hash("Renew your visa before the deadline.")
    );
}

#[test]
fn near_identical_articles_are_flagged_as_duplicates() {
    let original = "applying for a passport requires proof of identity proof of address \
                    and a recent photograph submitted through the online portal";
    let near_copy = "applying for a passport requires proof of identity proof of address \
                     and a recent photograph submitted through the official online portal";

    assert!(calculate_similarity(original, near_copy) > 0.6);

    let result = check_duplication(near_copy, &[original.to_string()], 0.6);
    assert!(result.is_duplicate);
}

#[test]
fn unrelated_articles_pass_the_duplication_scan() {
    let passport = "applying for a passport requires proof of identity and address";
    let cooking = "slow roasting vegetables brings out their natural sweetness over time";

    let result = check_duplication(cooking, &[passport.to_string()], 0.6);
    assert!(!result.is_duplicate);
    assert!(result.max_similarity < 0.1);
}

#[test]
fn phrasing_variants_collapse_to_one_topic_key() {
    let a = canonical_topic_key("how to renew passport india");
    let b = canonical_topic_key("passport renewal india step by step");
    assert_eq!(a, b);
}

#[test]
fn regulated_topics_are_recognized() {
    assert!(is_regulated_topic("how to renew passport"));
    assert!(!is_regulated_topic("best home workout routine"));
}
