//! Keyword model - operator-seeded topics that drive discovery.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::sql::Record;

/// A seed topic. Never hard-deleted; `active = false` retires it.
#[derive(FromRow, Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct Keyword {
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    pub keyword: String,

    #[builder(default, setter(strip_option))]
    pub category: Option<String>,

    #[builder(default = 0)]
    pub priority: i32,

    #[builder(default = true)]
    pub active: bool,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl Keyword {
    /// Active keywords in priority order, capped.
    pub async fn find_active(limit: i64, db: &sqlx::PgPool) -> Result<Vec<Self>> {
        let keywords = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, keyword, category, priority, active, created_at, updated_at
            FROM keywords
            WHERE active = true
            ORDER BY priority DESC, created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(keywords)
    }

    /// Insert a keyword unless the text already exists. Returns whether a
    /// row was created.
    pub async fn insert_if_new(&self, db: &sqlx::PgPool) -> Result<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO keywords (id, keyword, category, priority, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (keyword) DO NOTHING
            "#,
        )
        .bind(self.id)
        .bind(&self.keyword)
        .bind(&self.category)
        .bind(self.priority)
        .bind(self.active)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(db)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }

    /// Retire a keyword without deleting it.
    pub async fn deactivate(id: Uuid, db: &sqlx::PgPool) -> Result<()> {
        sqlx::query("UPDATE keywords SET active = false, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl Record for Keyword {
    const TABLE: &'static str = "keywords";
    type Id = Uuid;

    async fn find_by_id(id: Uuid, db: &sqlx::PgPool) -> Result<Self> {
        let keyword = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, keyword, category, priority, active, created_at, updated_at
            FROM keywords
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(keyword)
    }

    async fn insert(&self, db: &sqlx::PgPool) -> Result<Self> {
        let keyword = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO keywords (id, keyword, category, priority, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, keyword, category, priority, active, created_at, updated_at
            "#,
        )
        .bind(self.id)
        .bind(&self.keyword)
        .bind(&self.category)
        .bind(self.priority)
        .bind(self.active)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(db)
        .await?;

        Ok(keyword)
    }

    async fn update(&self, db: &sqlx::PgPool) -> Result<Self> {
        let keyword = sqlx::query_as::<_, Self>(
            r#"
            UPDATE keywords SET
                keyword = $1, category = $2, priority = $3, active = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, keyword, category, priority, active, created_at, updated_at
            "#,
        )
        .bind(&self.keyword)
        .bind(&self.category)
        .bind(self.priority)
        .bind(self.active)
        .bind(self.id)
        .fetch_one(db)
        .await?;

        Ok(keyword)
    }

    async fn delete(&self, db: &sqlx::PgPool) -> Result<()> {
        // Keywords are soft-deleted; a hard delete only exists for tests
        // and operator cleanup.
        sqlx::query("DELETE FROM keywords WHERE id = $1")
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
    fn builder_defaults_to_active() {
        let keyword = Keyword::builder().keyword("passport renewal").build();
        assert!(keyword.active);
        assert_eq!(keyword.priority, 0);
        assert!(keyword.category.is_none());
    }
}
