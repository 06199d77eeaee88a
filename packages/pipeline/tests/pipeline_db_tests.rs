//! Database-backed pipeline tests against a real Postgres instance.

mod common;

use std::sync::Arc;

use test_context::test_context;
use uuid::Uuid;

use common::{count_queries_with_text, sample_query, TestHarness};
use pipeline_core::config::PipelineConfig;
use pipeline_core::domains::pipeline::generation::run_generation;
use pipeline_core::domains::pipeline::PipelineStats;
use pipeline_core::domains::posts::quality::QualityGate;
use pipeline_core::domains::queries::models::QueryStatus;
use pipeline_core::domains::trust::{TrustConfig, TrustEngine};
use pipeline_core::kernel::testing::{MockPublisher, MockSuggestionProvider, MockWriter};
use pipeline_core::kernel::PipelineKernel;

#[test_context(TestHarness)]
#[tokio::test]
async fn rediscovered_query_inserts_only_once(ctx: &TestHarness) {
    let text = "how to renew a driving licence in spain";

    let first = sample_query(text);
    assert!(first
        .insert_if_new(&ctx.db_pool)
        .await
        .expect("first insert failed"));

    // Discovery re-running over the same suggestions must be a no-op.
    let second = sample_query(text);
    assert!(!second
        .insert_if_new(&ctx.db_pool)
        .await
        .expect("second insert failed"));

    assert_eq!(count_queries_with_text(text, &ctx.db_pool).await, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn publishing_commits_post_status_fingerprint_and_log_together(ctx: &TestHarness) {
    let text = "how to open a bank account in germany";
    let query = sample_query(text);
    query
        .insert_if_new(&ctx.db_pool)
        .await
        .expect("insert failed");

    let publisher = Arc::new(MockPublisher::new());
    let kernel = PipelineKernel::new(
        ctx.db_pool.clone(),
        Arc::new(MockSuggestionProvider::new()),
        Arc::new(MockWriter::new()),
        publisher.clone(),
        None,
    );
    let gate = QualityGate::new(3, 600);
    let trust = TrustEngine::new(TrustConfig {
        cooldown_minutes: 0,
        ..TrustConfig::default()
    });
    let config = PipelineConfig {
        publish_delay_ms: 0,
        trust_publish_delay_ms: 0,
        publish_cooldown_minutes: 0,
        ..PipelineConfig::default()
    };

    let outcome = run_generation(&kernel, &gate, &trust, &config)
        .await
        .expect("publish phase failed");
    assert!(outcome.succeeded >= 1);

    // The CMS saw the post.
    assert!(publisher
        .created_posts()
        .iter()
        .any(|p| p.title.contains(text)));

    // All four rows of the publish transaction landed together.
    let status: QueryStatus = sqlx::query_scalar("SELECT status FROM queries WHERE id = $1")
        .bind(query.id)
        .fetch_one(&ctx.db_pool)
        .await
        .expect("query row missing");
    assert_eq!(status, QueryStatus::Published);

    let post_id: Uuid = sqlx::query_scalar("SELECT id FROM posts WHERE query_id = $1")
        .bind(query.id)
        .fetch_one(&ctx.db_pool)
        .await
        .expect("post row missing");

    let fingerprints: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM content_fingerprints WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&ctx.db_pool)
            .await
            .expect("fingerprint count failed");
    assert_eq!(fingerprints, 1);

    let log_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM publish_log WHERE post_id = $1 AND action = 'created'",
    )
    .bind(post_id)
    .fetch_one(&ctx.db_pool)
    .await
    .expect("publish log count failed");
    assert_eq!(log_rows, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn stats_need_only_a_database_connection(ctx: &TestHarness) {
    let stats = PipelineStats::load(&ctx.db_pool)
        .await
        .expect("stats load failed");
    stats.log("Pipeline state");
    assert!(stats.total_queries >= 0);
}
