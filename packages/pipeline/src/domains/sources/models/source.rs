//! Source model - the external providers discovery consults.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use typed_builder::TypedBuilder;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "source_kind", rename_all = "snake_case")]
pub enum SourceKind {
    Suggest,
    Trends,
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Source {
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    pub name: String,
    pub kind: SourceKind,

    #[builder(default = true)]
    pub active: bool,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl Source {
    /// Record a provider the pipeline uses, once.
    pub async fn register(&self, db: &sqlx::PgPool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sources (id, name, kind, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(self.kind)
        .bind(self.active)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(db)
        .await?;

        Ok(())
    }

    pub async fn find_active(db: &sqlx::PgPool) -> Result<Vec<Self>> {
        let sources = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, name, kind, active, created_at, updated_at
            FROM sources
            WHERE active = true
            ORDER BY name ASC
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(sources)
    }
}
