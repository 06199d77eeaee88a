//! Post model - a committed content artifact on the CMS.
//!
//! Created at publish time; only the refresh cycle mutates it afterwards
//! (content hash, version, schedule fields). Never deleted by the pipeline.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::sql::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "post_status", rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    #[default]
    Published,
    Archived,
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Post {
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    #[builder(default, setter(strip_option))]
    pub query_id: Option<Uuid>,

    pub cms_post_id: i64,
    pub slug: String,
    pub title: String,
    pub content_hash: String,

    #[builder(default = 1)]
    pub version: i32,

    #[builder(default)]
    pub status: PostStatus,

    #[builder(default = Utc::now())]
    pub first_published_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub last_published_at: DateTime<Utc>,
    #[builder(default, setter(strip_option))]
    pub last_refreshed_at: Option<DateTime<Utc>>,
    #[builder(default, setter(strip_option))]
    pub next_refresh_at: Option<DateTime<Utc>>,

    #[builder(default = 0)]
    pub word_count: i32,
    #[builder(default = 0)]
    pub heading_count: i32,

    #[builder(default, setter(strip_option))]
    pub category: Option<String>,

    #[builder(default = 0.0)]
    pub quality_score: f64,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

const POST_COLUMNS: &str = r#"id, query_id, cms_post_id, slug, title, content_hash, version,
    status, first_published_at, last_published_at, last_refreshed_at, next_refresh_at,
    word_count, heading_count, category, quality_score, created_at, updated_at"#;

/// Summary of a published post, as the trust engine sees history.
#[derive(FromRow, Debug, Clone)]
pub struct PublishedSummary {
    pub id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub last_published_at: DateTime<Utc>,
}

impl Post {
    /// Posts published in the trailing window, newest first.
    pub async fn published_since(
        since: DateTime<Utc>,
        db: &sqlx::PgPool,
    ) -> Result<Vec<PublishedSummary>> {
        let posts = sqlx::query_as::<_, PublishedSummary>(
            r#"
            SELECT id, title, category, last_published_at
            FROM posts
            WHERE status = 'published' AND last_published_at >= $1
            ORDER BY last_published_at DESC
            "#,
        )
        .bind(since)
        .fetch_all(db)
        .await?;

        Ok(posts)
    }

    /// Every published post's title summary, for topic-existence checks.
    pub async fn all_published(db: &sqlx::PgPool) -> Result<Vec<PublishedSummary>> {
        let posts = sqlx::query_as::<_, PublishedSummary>(
            r#"
            SELECT id, title, category, last_published_at
            FROM posts
            WHERE status = 'published'
            ORDER BY last_published_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(posts)
    }

    /// Count publications in the trailing 24h, for the daily cap.
    pub async fn published_in_last_day(db: &sqlx::PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE status = 'published' AND last_published_at >= NOW() - INTERVAL '24 hours'
            "#,
        )
        .fetch_one(db)
        .await?;

        Ok(count)
    }

    /// Most recent publication timestamp, for the cooldown gate.
    pub async fn last_published_at(db: &sqlx::PgPool) -> Result<Option<DateTime<Utc>>> {
        let last = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT last_published_at FROM posts
            WHERE status = 'published'
            ORDER BY last_published_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(db)
        .await?;

        Ok(last)
    }

    /// Published posts due for a content refresh.
    ///
    /// Due means: never refreshed, OR the scheduled next-refresh time has
    /// passed, OR the last refresh is older than the configured interval.
    /// The grouping is deliberate and explicit.
    pub async fn find_due_for_refresh(
        interval_days: i64,
        limit: i64,
        db: &sqlx::PgPool,
    ) -> Result<Vec<Self>> {
        let posts = sqlx::query_as::<_, Self>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE status = 'published'
              AND (
                    last_refreshed_at IS NULL
                    OR next_refresh_at <= NOW()
                    OR last_refreshed_at < NOW() - ($1 || ' days')::INTERVAL
                  )
            ORDER BY COALESCE(last_refreshed_at, first_published_at) ASC
            LIMIT $2
            "#
        ))
        .bind(interval_days.to_string())
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(posts)
    }

    /// Next scheduled refresh time from now.
    pub fn schedule_next_refresh(interval_days: i64) -> DateTime<Utc> {
        Utc::now() + Duration::days(interval_days)
    }

    /// Insert inside an open transaction, so the post commits or rolls back
    /// together with its query-status update and audit row.
    pub async fn insert_tx(&self, tx: &mut sqlx::Transaction<'_, sqlx::Postgres>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, query_id, cms_post_id, slug, title, content_hash, version,
                status, first_published_at, last_published_at, last_refreshed_at, next_refresh_at,
                word_count, heading_count, category, quality_score, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(self.id)
        .bind(self.query_id)
        .bind(self.cms_post_id)
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.content_hash)
        .bind(self.version)
        .bind(self.status)
        .bind(self.first_published_at)
        .bind(self.last_published_at)
        .bind(self.last_refreshed_at)
        .bind(self.next_refresh_at)
        .bind(self.word_count)
        .bind(self.heading_count)
        .bind(&self.category)
        .bind(self.quality_score)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Apply refresh-cycle mutations inside an open transaction.
    pub async fn apply_refresh_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts SET
                content_hash = $1, version = $2, last_refreshed_at = $3, next_refresh_at = $4,
                word_count = $5, heading_count = $6, quality_score = $7, updated_at = NOW()
            WHERE id = $8
            "#,
        )
        .bind(&self.content_hash)
        .bind(self.version)
        .bind(self.last_refreshed_at)
        .bind(self.next_refresh_at)
        .bind(self.word_count)
        .bind(self.heading_count)
        .bind(self.quality_score)
        .bind(self.id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl Record for Post {
    const TABLE: &'static str = "posts";
    type Id = Uuid;

    async fn find_by_id(id: Uuid, db: &sqlx::PgPool) -> Result<Self> {
        let post = sqlx::query_as::<_, Self>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(post)
    }

    async fn insert(&self, db: &sqlx::PgPool) -> Result<Self> {
        let post = sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO posts (
                id, query_id, cms_post_id, slug, title, content_hash, version,
                status, first_published_at, last_published_at, last_refreshed_at, next_refresh_at,
                word_count, heading_count, category, quality_score, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.query_id)
        .bind(self.cms_post_id)
        .bind(&self.slug)
        .bind(&self.title)
        .bind(&self.content_hash)
        .bind(self.version)
        .bind(self.status)
        .bind(self.first_published_at)
        .bind(self.last_published_at)
        .bind(self.last_refreshed_at)
        .bind(self.next_refresh_at)
        .bind(self.word_count)
        .bind(self.heading_count)
        .bind(&self.category)
        .bind(self.quality_score)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(db)
        .await?;

        Ok(post)
    }

    async fn update(&self, db: &sqlx::PgPool) -> Result<Self> {
        let post = sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE posts SET
                content_hash = $1, version = $2, status = $3, last_published_at = $4,
                last_refreshed_at = $5, next_refresh_at = $6, word_count = $7,
                heading_count = $8, quality_score = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&self.content_hash)
        .bind(self.version)
        .bind(self.status)
        .bind(self.last_published_at)
        .bind(self.last_refreshed_at)
        .bind(self.next_refresh_at)
        .bind(self.word_count)
        .bind(self.heading_count)
        .bind(self.quality_score)
        .bind(self.id)
        .fetch_one(db)
        .await?;

        Ok(post)
    }

    async fn delete(&self, db: &sqlx::PgPool) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(self.id)
            .execute(db)
            .await?;

        Ok(())
    }
}
