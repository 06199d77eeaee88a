//! Publish log - append-only audit trail of pipeline decisions.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "publish_action", rename_all = "snake_case")]
pub enum PublishAction {
    Created,
    Refreshed,
    Rejected,
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct PublishLog {
    pub id: Uuid,
    pub post_id: Option<Uuid>,
    pub action: PublishAction,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

impl PublishLog {
    /// Append an audit row inside an open transaction so it commits or
    /// rolls back together with the post/query writes it describes.
    pub async fn append_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        post_id: Option<Uuid>,
        action: PublishAction,
        detail: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO publish_log (id, post_id, action, detail, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(action)
        .bind(detail)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Append an audit row outside any transaction (rejection records).
    pub async fn append(
        db: &sqlx::PgPool,
        post_id: Option<Uuid>,
        action: PublishAction,
        detail: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO publish_log (id, post_id, action, detail, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(action)
        .bind(detail)
        .execute(db)
        .await?;

        Ok(())
    }
}
