//! End-to-end admission flow over the pure pipeline components, with mock
//! collaborators standing in for the suggestion, writer, and CMS services.

use pipeline_core::common::utils::generate_content_hash;
use pipeline_core::domains::posts::quality::QualityGate;
use pipeline_core::domains::queries::models::{QueryStatus, YmylCategory};
use pipeline_core::domains::queries::safety::{SafetyClassifier, SafetyPolicy};
use pipeline_core::domains::queries::scoring::QueryScorer;
use pipeline_core::domains::trust::engine::{
    DiversityStats, TrustConfig, TrustContext, TrustEngine,
};
use pipeline_core::kernel::testing::{MockPublisher, MockWriter};
use pipeline_core::kernel::{BasePublisher, BaseWriter, PostPayload};

fn default_gate() -> QualityGate {
    QualityGate::new(3, 600)
}

#[tokio::test]
async fn clean_procedural_query_flows_through_to_publication() {
    let scorer = QueryScorer::new();
    let classifier = SafetyClassifier::new(SafetyPolicy::default());
    let trust = TrustEngine::new(TrustConfig::default());
    let gate = default_gate();
    let writer = MockWriter::new();
    let publisher = MockPublisher::new();

    let text = "how to renew passport";

    let classification = classifier.classify(text);
    assert!(classification.is_safe_to_process());
    assert_eq!(classification.category, YmylCategory::None);

    let scores = scorer.score(text, classification.risk);
    assert!(scores.intent >= 0.85);
    assert!(scores.combined > 0.6);

    let decision = trust.check_admission(text, &TrustContext::default());
    assert!(decision.admitted, "novel topic should be admitted: {:?}", decision.reasons);

    let outline = writer.generate_outline(text, None).await.unwrap();
    assert!(outline.sections.len() >= 3);
    assert!(trust.validate_title(&outline.title).is_ok());

    let draft = writer.generate_article(text, &outline, None).await.unwrap();
    let report = gate.check(&draft.content, draft.word_count);
    assert!(report.passed, "gate issues: {:?}", report.issues);

    let payload = PostPayload {
        title: draft.title.clone(),
        slug: "how-to-renew-passport".to_string(),
        content: draft.content.clone(),
        meta_description: draft.meta_description.clone(),
        category: None,
        tags: Vec::new(),
    };
    let published = publisher.create_post(&payload).await.unwrap();

    assert!(published.id >= 1000);
    let created = publisher.created_posts();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].slug, "how-to-renew-passport");
}

#[test]
fn blocked_query_never_reaches_generation() {
    let classifier = SafetyClassifier::new(SafetyPolicy::default());

    let classification = classifier.classify("how to make a bomb at home");
    assert!(classification.is_blocked);
    assert_eq!(classification.status, QueryStatus::Rejected);
    assert!(!classification.is_safe_to_process());
}

#[test]
fn repeat_topic_is_rejected_at_admission() {
    let trust = TrustEngine::new(TrustConfig::default());

    let prior = "How to Renew Passport in India".to_string();
    let context = TrustContext {
        published_titles: vec![prior.clone()],
        window: DiversityStats::from_window([(prior.as_str(), None)]),
        last_published_at: None,
    };

    let decision = trust.check_admission("passport renewal india", &context);
    assert!(!decision.admitted);
    assert!(!decision.reasons.is_empty());
}

#[test]
fn thin_article_fails_the_gate_even_for_a_strong_query() {
    let scorer = QueryScorer::new();
    let gate = default_gate();

    let scores = scorer.score("how to apply for driving licence", 0.0);
    assert!(scores.combined > 0.6);

    let content = "<h1>Driving Licence</h1><h2>Steps</h2><p>Apply online.</p>";
    let report = gate.check(content, 40);
    assert!(!report.passed);
    assert!(report.issues.iter().any(|i| i.contains("word count")));
}

#[tokio::test]
async fn identical_drafts_share_a_fingerprint() {
    let writer = MockWriter::new();

    let outline = writer.generate_outline("how to renew passport", None).await.unwrap();
    let first = writer
        .generate_article("how to renew passport", &outline, None)
        .await
        .unwrap();
    let second = writer
        .generate_article("how to renew passport", &outline, None)
        .await
        .unwrap();

    assert_eq!(
        generate_content_hash(&first.content),
        generate_content_hash(&second.content)
    );
}
