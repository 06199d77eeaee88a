//! Discovery phase - turn seed keywords into scored, classified queries.
//!
//! One suggestion fetch per active keyword with a pacing delay between
//! fetches. A failed fetch counts against the keyword and the loop moves
//! on; only database errors abort the phase.

use anyhow::Result;
use std::time::Duration;

use crate::common::utils::text::normalize;
use crate::config::PipelineConfig;
use crate::domains::jobs::models::{JobPhase, PipelineJob};
use crate::domains::keywords::models::Keyword;
use crate::domains::queries::models::{Query, QueryStatus};
use crate::domains::queries::safety::SafetyClassifier;
use crate::domains::queries::scoring::QueryScorer;
use crate::kernel::PipelineKernel;

use super::PhaseOutcome;

/// Run the discovery phase under a job record. Counters are per keyword.
pub async fn run_discovery(
    kernel: &PipelineKernel,
    scorer: &QueryScorer,
    classifier: &SafetyClassifier,
    config: &PipelineConfig,
) -> Result<PhaseOutcome> {
    let db = &kernel.db_pool;
    let job = PipelineJob::start(JobPhase::Discover, db).await?;
    let mut outcome = PhaseOutcome::default();

    match discover_keywords(kernel, scorer, classifier, config, &mut outcome).await {
        Ok(()) => {
            job.complete(outcome.processed, outcome.succeeded, outcome.failed, db)
                .await?;
            Ok(outcome)
        }
        Err(e) => {
            let detail = format!("{e:#}");
            tracing::error!("Discovery phase failed: {detail}");
            job.fail(
                outcome.processed,
                outcome.succeeded,
                outcome.failed,
                &detail,
                db,
            )
            .await?;
            Err(e)
        }
    }
}

async fn discover_keywords(
    kernel: &PipelineKernel,
    scorer: &QueryScorer,
    classifier: &SafetyClassifier,
    config: &PipelineConfig,
    outcome: &mut PhaseOutcome,
) -> Result<()> {
    let db = &kernel.db_pool;
    let keywords = Keyword::find_active(config.keywords_per_run, db).await?;

    if keywords.is_empty() {
        tracing::info!("No active keywords; discovery has nothing to do");
        return Ok(());
    }

    tracing::info!("Discovering against {} active keywords", keywords.len());

    let mut created = 0usize;
    for (i, keyword) in keywords.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(config.discovery_delay_ms)).await;
        }

        outcome.processed += 1;
        let suggestions = match kernel.suggestions.discover(&keyword.keyword).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::warn!("Suggestion fetch failed for '{}': {e:#}", keyword.keyword);
                outcome.failed += 1;
                continue;
            }
        };

        for suggestion in &suggestions {
            if persist_candidate(kernel, scorer, classifier, keyword, &suggestion.query).await? {
                created += 1;
            }
        }
        outcome.succeeded += 1;
    }

    tracing::info!(
        "Discovery created {created} new queries from {} keywords",
        outcome.processed
    );
    Ok(())
}

/// Score, classify, and persist one candidate. Returns whether a new row
/// was created. Rejected classifications are persisted too; they are
/// admission decisions, not errors.
async fn persist_candidate(
    kernel: &PipelineKernel,
    scorer: &QueryScorer,
    classifier: &SafetyClassifier,
    keyword: &Keyword,
    text: &str,
) -> Result<bool> {
    let db = &kernel.db_pool;

    let normalized = normalize(text);
    if normalized.is_empty() {
        return Ok(false);
    }
    if Query::exists_normalized(&normalized, db).await? {
        return Ok(false);
    }

    let classification = classifier.classify(text);
    let scores = scorer.score(text, classification.risk);

    let mut query = Query::builder()
        .query(text)
        .normalized_query(normalized)
        .keyword_id(keyword.id)
        .intent_score(scores.intent)
        .evergreen_score(scores.evergreen)
        .ymyl_risk(classification.risk)
        .combined_score(scores.combined)
        .is_ymyl(classification.is_ymyl)
        .ymyl_category(classification.category)
        .status(classification.status)
        .build();
    query.category = keyword.category.clone();
    query.review_notes = match classification.status {
        QueryStatus::Rejected => Some("rejected by safety classifier".to_string()),
        QueryStatus::ReviewRequired => Some("risk above review threshold".to_string()),
        _ => None,
    };

    query.insert_if_new(db).await
}

/// Best-effort trend discovery. Trending phrases become low-priority seed
/// keywords; a fetch failure is recorded on the job but never propagated.
pub async fn run_trend_discovery(kernel: &PipelineKernel) -> Result<PhaseOutcome> {
    let db = &kernel.db_pool;
    let Some(trends) = kernel.trends.as_ref() else {
        return Ok(PhaseOutcome::default());
    };

    let job = PipelineJob::start(JobPhase::Strategy, db).await?;
    let mut outcome = PhaseOutcome::default();

    let topics = match trends.trending().await {
        Ok(topics) => topics,
        Err(e) => {
            let detail = format!("{e:#}");
            tracing::warn!("Trend fetch failed: {detail}");
            job.fail(0, 0, 0, &detail, db).await?;
            return Ok(outcome);
        }
    };

    for topic in topics {
        outcome.processed += 1;
        let keyword = Keyword::builder().keyword(topic.clone()).priority(-1).build();
        match keyword.insert_if_new(db).await {
            Ok(true) => outcome.succeeded += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Failed to store trend keyword '{topic}': {e:#}");
                outcome.failed += 1;
            }
        }
    }

    tracing::info!(
        "Trend discovery stored {} of {} topics as keywords",
        outcome.succeeded,
        outcome.processed
    );
    job.complete(outcome.processed, outcome.succeeded, outcome.failed, db)
        .await?;
    Ok(outcome)
}
