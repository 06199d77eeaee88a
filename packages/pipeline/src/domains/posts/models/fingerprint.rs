//! Content fingerprints - stable hashes used to short-circuit duplicate
//! content before similarity scanning.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(FromRow, Debug, Clone)]
pub struct ContentFingerprint {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl ContentFingerprint {
    /// Whether this exact normalized content has been published before.
    pub async fn exists(content_hash: &str, db: &sqlx::PgPool) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM content_fingerprints WHERE content_hash = $1",
        )
        .bind(content_hash)
        .fetch_one(db)
        .await?;

        Ok(count > 0)
    }

    /// Record a fingerprint inside the publication transaction.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        post_id: Uuid,
        content_hash: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content_fingerprints (id, post_id, content_hash, created_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(content_hash)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
