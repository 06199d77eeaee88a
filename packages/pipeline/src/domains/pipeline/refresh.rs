//! Refresh phase - regenerate stale published posts in place.
//!
//! Runs only when the publish phase produced nothing, so refreshes never
//! compete with new publications for the daily cap. A refreshed post keeps
//! its slug and CMS id; the version increments only when the regenerated
//! content actually differs.

use anyhow::Result;
use chrono::Utc;
use std::time::Duration;

use crate::common::utils::generate_content_hash;
use crate::common::PipelineError;
use crate::config::PipelineConfig;
use crate::domains::jobs::models::{JobPhase, PipelineJob};
use crate::domains::posts::models::{Post, PublishAction, PublishLog};
use crate::domains::posts::quality::QualityGate;
use crate::kernel::{PipelineKernel, PostPayload};

use super::generation;
use super::PhaseOutcome;

/// Run the refresh phase under a job record. Counters are per post.
pub async fn run_refresh(
    kernel: &PipelineKernel,
    gate: &QualityGate,
    config: &PipelineConfig,
) -> Result<PhaseOutcome> {
    let db = &kernel.db_pool;
    let job = PipelineJob::start(JobPhase::Refresh, db).await?;
    let mut outcome = PhaseOutcome::default();

    match refresh_due_posts(kernel, gate, config, &mut outcome).await {
        Ok(()) => {
            job.complete(outcome.processed, outcome.succeeded, outcome.failed, db)
                .await?;
            Ok(outcome)
        }
        Err(e) => {
            let detail = format!("{e:#}");
            tracing::error!("Refresh phase failed: {detail}");
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

async fn refresh_due_posts(
    kernel: &PipelineKernel,
    gate: &QualityGate,
    config: &PipelineConfig,
    outcome: &mut PhaseOutcome,
) -> Result<()> {
    let db = &kernel.db_pool;

    let posts =
        Post::find_due_for_refresh(config.refresh_interval_days, config.daily_publish_cap, db)
            .await?;
    if posts.is_empty() {
        tracing::info!("No posts due for refresh");
        return Ok(());
    }

    tracing::info!("Refreshing {} stale posts", posts.len());

    for (i, post) in posts.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(config.publish_delay_ms)).await;
        }

        outcome.processed += 1;
        match refresh_one(kernel, gate, config, post).await {
            Ok(()) => outcome.succeeded += 1,
            Err(e) if generation::is_item_scoped(&e) => {
                tracing::warn!("Skipping refresh of '{}': {e:#}", post.title);
                outcome.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

async fn refresh_one(
    kernel: &PipelineKernel,
    gate: &QualityGate,
    config: &PipelineConfig,
    post: &Post,
) -> Result<()> {
    let db = &kernel.db_pool;
    let category = post.category.as_deref();

    let outline = kernel
        .writer
        .generate_outline(&post.title, category)
        .await
        .map_err(|e| PipelineError::Provider(format!("outline generation failed: {e:#}")))?;

    if outline.title.trim().is_empty() || outline.sections.len() < 3 {
        return Err(PipelineError::Validation(
            "outline missing a title or has fewer than 3 sections".to_string(),
        )
        .into());
    }

    let draft = kernel
        .writer
        .generate_article(&post.title, &outline, category)
        .await
        .map_err(|e| PipelineError::Provider(format!("article generation failed: {e:#}")))?;

    let report = gate.check(&draft.content, draft.word_count);
    if !report.passed {
        return Err(
            PipelineError::Validation(format!("quality gate failed: {}", report.issues.join("; ")))
                .into(),
        );
    }

    let new_hash = generate_content_hash(&draft.content);
    if new_hash == post.content_hash {
        // Same content; reschedule without touching the CMS or the version.
        let mut rescheduled = post.clone();
        rescheduled.last_refreshed_at = Some(Utc::now());
        rescheduled.next_refresh_at =
            Some(Post::schedule_next_refresh(config.refresh_interval_days));

        let mut tx = db.begin().await?;
        rescheduled.apply_refresh_tx(&mut tx).await?;
        tx.commit().await?;

        tracing::info!("Refresh of '{}' produced identical content; rescheduled", post.title);
        return Ok(());
    }

    let payload = PostPayload {
        title: draft.title.clone(),
        slug: post.slug.clone(),
        content: draft.content.clone(),
        meta_description: draft.meta_description.clone(),
        category: post.category.clone(),
        tags: Vec::new(),
    };

    kernel
        .publisher
        .update_post(post.cms_post_id, &payload)
        .await
        .map_err(|e| PipelineError::Provider(format!("CMS update failed: {e:#}")))?;

    let mut refreshed = post.clone();
    refreshed.content_hash = new_hash;
    refreshed.version += 1;
    refreshed.last_refreshed_at = Some(Utc::now());
    refreshed.next_refresh_at = Some(Post::schedule_next_refresh(config.refresh_interval_days));
    refreshed.word_count = draft.word_count as i32;
    refreshed.heading_count = draft.headings.len() as i32;
    refreshed.quality_score = report.score;

    let mut tx = db.begin().await?;
    refreshed.apply_refresh_tx(&mut tx).await?;
    PublishLog::append_tx(
        &mut tx,
        Some(post.id),
        PublishAction::Refreshed,
        &format!("refreshed '{}' to version {}", refreshed.title, refreshed.version),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        "Refreshed '{}' to version {} (quality {:.2})",
        refreshed.title,
        refreshed.version,
        report.score
    );
    Ok(())
}
