//! Query model - a discovered candidate search query.
//!
//! Queries are created once by discovery, scored and classified at creation,
//! and never re-scored. Status moves one way: classification decides the
//! initial value, the pipeline decides the terminal one.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::sql::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "query_status", rename_all = "snake_case")]
pub enum QueryStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Published,
    ReviewRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "ymyl_category", rename_all = "snake_case")]
pub enum YmylCategory {
    Health,
    Finance,
    Legal,
    Safety,
    #[default]
    None,
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Query {
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    pub query: String,
    pub normalized_query: String,

    #[builder(default, setter(strip_option))]
    pub keyword_id: Option<Uuid>,

    pub intent_score: f64,
    pub evergreen_score: f64,
    pub ymyl_risk: f64,
    pub combined_score: f64,

    #[builder(default = false)]
    pub is_ymyl: bool,
    #[builder(default)]
    pub ymyl_category: YmylCategory,

    #[builder(default, setter(strip_option))]
    pub category: Option<String>,

    #[builder(default)]
    pub status: QueryStatus,
    #[builder(default, setter(strip_option))]
    pub review_notes: Option<String>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

const QUERY_COLUMNS: &str = r#"id, query, normalized_query, keyword_id,
    intent_score, evergreen_score, ymyl_risk, combined_score,
    is_ymyl, ymyl_category, category, status, review_notes,
    created_at, updated_at"#;

impl Query {
    /// Whether a candidate with this normalized text is already persisted.
    pub async fn exists_normalized(normalized: &str, db: &sqlx::PgPool) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM queries WHERE normalized_query = $1",
        )
        .bind(normalized)
        .fetch_one(db)
        .await?;

        Ok(count > 0)
    }

    /// Insert unless the raw text already exists. Returns whether a row was
    /// created, which makes re-running discovery idempotent.
    pub async fn insert_if_new(&self, db: &sqlx::PgPool) -> Result<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO queries (
                id, query, normalized_query, keyword_id,
                intent_score, evergreen_score, ymyl_risk, combined_score,
                is_ymyl, ymyl_category, category, status, review_notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (query) DO NOTHING
            "#,
        )
        .bind(self.id)
        .bind(&self.query)
        .bind(&self.normalized_query)
        .bind(self.keyword_id)
        .bind(self.intent_score)
        .bind(self.evergreen_score)
        .bind(self.ymyl_risk)
        .bind(self.combined_score)
        .bind(self.is_ymyl)
        .bind(self.ymyl_category)
        .bind(&self.category)
        .bind(self.status)
        .bind(&self.review_notes)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(db)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }

    /// Pending/approved queries in descending combined-score order.
    ///
    /// This ordering is the generation phase's admission order: higher-value
    /// queries get first claim on the daily cap.
    pub async fn find_publishable(limit: i64, db: &sqlx::PgPool) -> Result<Vec<Self>> {
        let queries = sqlx::query_as::<_, Self>(&format!(
            r#"
            SELECT {QUERY_COLUMNS}
            FROM queries
            WHERE status IN ('pending', 'approved')
            ORDER BY combined_score DESC, created_at ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(queries)
    }

    /// Record a terminal pipeline decision with a reason.
    pub async fn set_status(
        id: Uuid,
        status: QueryStatus,
        notes: Option<&str>,
        db: &sqlx::PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queries
            SET status = $1, review_notes = COALESCE($2, review_notes), updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status)
        .bind(notes)
        .bind(id)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Same as [`set_status`](Self::set_status), but inside an open
    /// transaction so the status flip commits with the post it belongs to.
    pub async fn set_status_tx(
        id: Uuid,
        status: QueryStatus,
        notes: Option<&str>,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queries
            SET status = $1, review_notes = COALESCE($2, review_notes), updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status)
        .bind(notes)
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl Record for Query {
    const TABLE: &'static str = "queries";
    type Id = Uuid;

    async fn find_by_id(id: Uuid, db: &sqlx::PgPool) -> Result<Self> {
        let query = sqlx::query_as::<_, Self>(&format!(
            "SELECT {QUERY_COLUMNS} FROM queries WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(query)
    }

    async fn insert(&self, db: &sqlx::PgPool) -> Result<Self> {
        let query = sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO queries (
                id, query, normalized_query, keyword_id,
                intent_score, evergreen_score, ymyl_risk, combined_score,
                is_ymyl, ymyl_category, category, status, review_notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {QUERY_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(&self.query)
        .bind(&self.normalized_query)
        .bind(self.keyword_id)
        .bind(self.intent_score)
        .bind(self.evergreen_score)
        .bind(self.ymyl_risk)
        .bind(self.combined_score)
        .bind(self.is_ymyl)
        .bind(self.ymyl_category)
        .bind(&self.category)
        .bind(self.status)
        .bind(&self.review_notes)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(db)
        .await?;

        Ok(query)
    }

    async fn update(&self, db: &sqlx::PgPool) -> Result<Self> {
        let query = sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE queries SET
                status = $1, review_notes = $2, category = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {QUERY_COLUMNS}
            "#
        ))
        .bind(self.status)
        .bind(&self.review_notes)
        .bind(&self.category)
        .bind(self.id)
        .fetch_one(db)
        .await?;

        Ok(query)
    }

    async fn delete(&self, db: &sqlx::PgPool) -> Result<()> {
        sqlx::query("DELETE FROM queries WHERE id = $1")
            .bind(self.id)
            .execute(db)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_pending_non_ymyl() {
        let query = Query::builder()
            .query("how to renew passport")
            .normalized_query("how to renew passport")
            .intent_score(0.9)
            .evergreen_score(0.85)
            .ymyl_risk(0.0)
            .combined_score(0.9)
            .build();

        assert_eq!(query.status, QueryStatus::Pending);
        assert_eq!(query.ymyl_category, YmylCategory::None);
        assert!(!query.is_ymyl);
    }
}
