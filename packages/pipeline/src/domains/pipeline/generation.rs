//! Publish phase - generate articles for admitted queries and push them to
//! the CMS.
//!
//! Admission order is descending combined score. Every candidate passes the
//! trust check, outline validation, the quality gate, and duplicate checks
//! before the CMS sees it. A publication is one transaction: post row,
//! query status flip, fingerprint, audit row.

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use std::time::Duration;

use crate::common::utils::generate_content_hash;
use crate::common::utils::text::slugify;
use crate::common::PipelineError;
use crate::config::PipelineConfig;
use crate::domains::jobs::models::{JobPhase, PipelineJob};
use crate::domains::posts::models::{ContentFingerprint, Post, PublishAction, PublishLog};
use crate::domains::posts::quality::{check_duplication, QualityGate};
use crate::domains::queries::models::{Query, QueryStatus};
use crate::domains::trust::engine::{DiversityStats, TrustContext, TrustEngine};
use crate::kernel::{PipelineKernel, PostPayload};

use super::PhaseOutcome;

/// Run the publish phase under a job record. Counters are per query.
pub async fn run_generation(
    kernel: &PipelineKernel,
    gate: &QualityGate,
    trust: &TrustEngine,
    config: &PipelineConfig,
) -> Result<PhaseOutcome> {
    let db = &kernel.db_pool;
    let job = PipelineJob::start(JobPhase::Publish, db).await?;
    let mut outcome = PhaseOutcome::default();

    match publish_queries(kernel, gate, trust, config, &mut outcome).await {
        Ok(()) => {
            job.complete(outcome.processed, outcome.succeeded, outcome.failed, db)
                .await?;
            Ok(outcome)
        }
        Err(e) => {
            let detail = format!("{e:#}");
            tracing::error!("Publish phase failed: {detail}");
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

async fn publish_queries(
    kernel: &PipelineKernel,
    gate: &QualityGate,
    trust: &TrustEngine,
    config: &PipelineConfig,
    outcome: &mut PhaseOutcome,
) -> Result<()> {
    let db = &kernel.db_pool;

    let published_today = Post::published_in_last_day(db).await?;
    if published_today >= config.daily_publish_cap {
        tracing::info!(
            "Daily publish cap reached ({published_today}/{}); skipping publish phase",
            config.daily_publish_cap
        );
        return Ok(());
    }

    let remaining = config.daily_publish_cap - published_today;
    let queries = Query::find_publishable(remaining, db).await?;
    if queries.is_empty() {
        tracing::info!("No publishable queries");
        return Ok(());
    }

    tracing::info!(
        "Publishing up to {remaining} of {} publishable queries",
        queries.len()
    );

    // Contents published within this run, for the near-duplicate scan.
    // Exact cross-run duplicates are caught by the fingerprint hash.
    let mut run_contents: Vec<String> = Vec::new();

    for query in &queries {
        // The cap can fill up mid-phase; re-check before every item.
        if Post::published_in_last_day(db).await? >= config.daily_publish_cap {
            tracing::info!("Daily publish cap reached mid-phase; stopping");
            break;
        }

        // The cooldown is batch-scoped, not a verdict on the query: pause
        // the phase and leave the remaining backlog for the next run.
        if config.trust_checks_enabled {
            let last = Post::last_published_at(db).await?;
            if let Err(reason) = trust.check_cooldown(last) {
                tracing::info!("Pausing publish phase: {reason}");
                break;
            }
        }

        outcome.processed += 1;
        match publish_one(kernel, gate, trust, config, query, &run_contents).await {
            Ok(content) => {
                run_contents.push(content);
                outcome.succeeded += 1;

                let delay_ms = if config.trust_mode {
                    config.trust_publish_delay_ms
                } else {
                    config.publish_delay_ms
                };
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(e) if is_item_scoped(&e) => {
                tracing::warn!("Skipping '{}': {e:#}", query.query);
                outcome.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

pub(super) fn is_item_scoped(e: &anyhow::Error) -> bool {
    e.downcast_ref::<PipelineError>()
        .map(PipelineError::is_item_scoped)
        .unwrap_or(false)
}

/// Load the trust engine's view of publication history.
pub async fn load_trust_context(db: &PgPool) -> Result<TrustContext> {
    let all_published = Post::all_published(db).await?;
    let window_posts = Post::published_since(Utc::now() - ChronoDuration::hours(24), db).await?;
    let last_published_at = Post::last_published_at(db).await?;

    let window = DiversityStats::from_window(
        window_posts
            .iter()
            .map(|p| (p.title.as_str(), p.category.as_deref())),
    );

    Ok(TrustContext {
        published_titles: all_published.into_iter().map(|p| p.title).collect(),
        window,
        last_published_at,
    })
}

/// Take one query all the way from admission to a committed post. Returns
/// the published content so the caller can extend its in-run dedup corpus.
async fn publish_one(
    kernel: &PipelineKernel,
    gate: &QualityGate,
    trust: &TrustEngine,
    config: &PipelineConfig,
    query: &Query,
    run_contents: &[String],
) -> Result<String> {
    let db = &kernel.db_pool;

    if config.trust_checks_enabled {
        let context = load_trust_context(db).await?;
        let decision = trust.check_admission(&query.query, &context);
        if !decision.admitted {
            let detail = decision.reasons.join("; ");
            Query::set_status(query.id, QueryStatus::Rejected, Some(&detail), db).await?;
            PublishLog::append(
                db,
                None,
                PublishAction::Rejected,
                &format!("{}: {detail}", query.query),
            )
            .await?;
            return Err(PipelineError::Blocked(detail).into());
        }
    }

    let category = query.category.as_deref();

    let outline = kernel
        .writer
        .generate_outline(&query.query, category)
        .await
        .map_err(|e| PipelineError::Provider(format!("outline generation failed: {e:#}")))?;

    if outline.title.trim().is_empty() || outline.sections.len() < 3 {
        return Err(PipelineError::Validation(
            "outline missing a title or has fewer than 3 sections".to_string(),
        )
        .into());
    }
    if let Err(reason) = trust.validate_title(&outline.title) {
        return Err(PipelineError::Validation(reason).into());
    }

    let draft = kernel
        .writer
        .generate_article(&query.query, &outline, category)
        .await
        .map_err(|e| PipelineError::Provider(format!("article generation failed: {e:#}")))?;

    let report = gate.check(&draft.content, draft.word_count);
    if !report.passed {
        let detail = report.issues.join("; ");
        PublishLog::append(
            db,
            None,
            PublishAction::Rejected,
            &format!("{}: {detail}", query.query),
        )
        .await?;
        return Err(PipelineError::Validation(format!("quality gate failed: {detail}")).into());
    }

    let content_hash = generate_content_hash(&draft.content);
    if ContentFingerprint::exists(&content_hash, db).await? {
        Query::set_status(
            query.id,
            QueryStatus::Rejected,
            Some("duplicate content hash"),
            db,
        )
        .await?;
        return Err(PipelineError::Blocked("duplicate content hash".to_string()).into());
    }

    let duplication = check_duplication(&draft.content, run_contents, config.max_content_similarity);
    if duplication.is_duplicate {
        return Err(PipelineError::Blocked(format!(
            "content similarity {:.2} against a post from this run",
            duplication.max_similarity
        ))
        .into());
    }

    let slug = slugify(&outline.title);
    let payload = PostPayload {
        title: draft.title.clone(),
        slug: slug.clone(),
        content: draft.content.clone(),
        meta_description: draft.meta_description.clone(),
        category: query.category.clone(),
        tags: Vec::new(),
    };

    let published = kernel
        .publisher
        .create_post(&payload)
        .await
        .map_err(|e| PipelineError::Provider(format!("publish failed: {e:#}")))?;

    let mut post = Post::builder()
        .query_id(query.id)
        .cms_post_id(published.id)
        .slug(slug)
        .title(draft.title.clone())
        .content_hash(content_hash.clone())
        .word_count(draft.word_count as i32)
        .heading_count(draft.headings.len() as i32)
        .quality_score(report.score)
        .next_refresh_at(Post::schedule_next_refresh(config.refresh_interval_days))
        .build();
    post.category = query.category.clone();

    let mut tx = db.begin().await?;
    post.insert_tx(&mut tx).await?;
    Query::set_status_tx(query.id, QueryStatus::Published, None, &mut tx).await?;
    ContentFingerprint::insert_tx(&mut tx, post.id, &content_hash).await?;
    PublishLog::append_tx(
        &mut tx,
        Some(post.id),
        PublishAction::Created,
        &format!("published '{}' at {}", post.title, published.url),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        "Published '{}' (cms post {}, quality {:.2})",
        post.title,
        published.id,
        report.score
    );
    Ok(draft.content)
}
