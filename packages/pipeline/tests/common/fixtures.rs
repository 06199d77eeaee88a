//! Shared fixtures for database-backed tests.

use pipeline_core::common::utils::text::normalize;
use pipeline_core::domains::queries::models::Query;
use sqlx::PgPool;

/// A scored candidate in the state discovery leaves it in.
pub fn sample_query(text: &str) -> Query {
    Query::builder()
        .query(text)
        .normalized_query(normalize(text))
        .intent_score(0.8)
        .evergreen_score(0.7)
        .ymyl_risk(0.0)
        .combined_score(0.75)
        .build()
}

/// Rows in the queries table with this exact text.
pub async fn count_queries_with_text(text: &str, pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM queries WHERE query = $1")
        .bind(text)
        .fetch_one(pool)
        .await
        .expect("Failed to count queries")
}
