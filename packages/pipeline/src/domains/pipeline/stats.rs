//! Table-count snapshot for operator visibility.

use anyhow::Result;
use sqlx::PgPool;

/// Point-in-time counts across the pipeline tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    pub active_keywords: i64,
    pub total_queries: i64,
    pub pending_queries: i64,
    pub published_posts: i64,
    pub published_last_day: i64,
    pub failed_jobs: i64,
}

impl PipelineStats {
    pub async fn load(db: &PgPool) -> Result<Self> {
        let active_keywords =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM keywords WHERE active = TRUE")
                .fetch_one(db)
                .await?;
        let total_queries = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM queries")
            .fetch_one(db)
            .await?;
        let pending_queries = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM queries WHERE status IN ('pending', 'approved')",
        )
        .fetch_one(db)
        .await?;
        let published_posts =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE status = 'published'")
                .fetch_one(db)
                .await?;
        let published_last_day = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE status = 'published' AND last_published_at >= NOW() - INTERVAL '24 hours'
            "#,
        )
        .fetch_one(db)
        .await?;
        let failed_jobs =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs WHERE status = 'failed'")
                .fetch_one(db)
                .await?;

        Ok(Self {
            active_keywords,
            total_queries,
            pending_queries,
            published_posts,
            published_last_day,
            failed_jobs,
        })
    }

    pub fn log(&self, label: &str) {
        tracing::info!(
            "{label}: {} active keywords, {} queries ({} publishable), {} published posts ({} in last 24h), {} failed jobs",
            self.active_keywords,
            self.total_queries,
            self.pending_queries,
            self.published_posts,
            self.published_last_day,
            self.failed_jobs,
        );
    }
}
