//! Pipeline job model - one phase execution, independently auditable.
//!
//! A row is created before phase work begins and finalized at the end, so a
//! crash mid-phase leaves a `running` row visible for alerting instead of
//! silently vanishing.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::common::sql::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_phase", rename_all = "snake_case")]
pub enum JobPhase {
    Discover,
    Publish,
    Refresh,
    Strategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(FromRow, Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct PipelineJob {
    #[builder(default = Uuid::new_v4())]
    pub id: Uuid,

    pub phase: JobPhase,

    #[builder(default)]
    pub status: JobStatus,

    #[builder(default = 0)]
    pub items_processed: i32,
    #[builder(default = 0)]
    pub items_succeeded: i32,
    #[builder(default = 0)]
    pub items_failed: i32,

    #[builder(default, setter(strip_option))]
    pub error_message: Option<String>,

    #[builder(default, setter(strip_option))]
    pub started_at: Option<DateTime<Utc>>,
    #[builder(default, setter(strip_option))]
    pub completed_at: Option<DateTime<Utc>>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

const JOB_COLUMNS: &str = r#"id, phase, status, items_processed, items_succeeded, items_failed,
    error_message, started_at, completed_at, created_at, updated_at"#;

impl PipelineJob {
    /// Insert a running job row before phase work begins.
    pub async fn start(phase: JobPhase, db: &sqlx::PgPool) -> Result<Self> {
        let job = Self::builder()
            .phase(phase)
            .status(JobStatus::Running)
            .started_at(Utc::now())
            .build();
        job.insert(db).await
    }

    /// Finalize a job as completed with its counters.
    pub async fn complete(
        mut self,
        processed: i32,
        succeeded: i32,
        failed: i32,
        db: &sqlx::PgPool,
    ) -> Result<Self> {
        debug_assert!(succeeded + failed <= processed);
        self.status = JobStatus::Completed;
        self.items_processed = processed;
        self.items_succeeded = succeeded;
        self.items_failed = failed;
        self.completed_at = Some(Utc::now());
        self.update(db).await
    }

    /// Finalize a job as failed, keeping whatever counters were reached.
    pub async fn fail(
        mut self,
        processed: i32,
        succeeded: i32,
        failed: i32,
        error: &str,
        db: &sqlx::PgPool,
    ) -> Result<Self> {
        self.status = JobStatus::Failed;
        self.items_processed = processed;
        self.items_succeeded = succeeded;
        self.items_failed = failed;
        self.error_message = Some(error.to_string());
        self.completed_at = Some(Utc::now());
        self.update(db).await
    }

    /// Jobs stuck at `running` longer than the given age, for alerting.
    pub async fn find_stuck(older_than_minutes: i64, db: &sqlx::PgPool) -> Result<Vec<Self>> {
        let jobs = sqlx::query_as::<_, Self>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE status = 'running'
              AND started_at < NOW() - ($1 || ' minutes')::INTERVAL
            ORDER BY started_at ASC
            "#
        ))
        .bind(older_than_minutes.to_string())
        .fetch_all(db)
        .await?;

        Ok(jobs)
    }
}

#[async_trait::async_trait]
impl Record for PipelineJob {
    const TABLE: &'static str = "jobs";
    type Id = Uuid;

    async fn find_by_id(id: Uuid, db: &sqlx::PgPool) -> Result<Self> {
        let job = sqlx::query_as::<_, Self>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(job)
    }

    async fn insert(&self, db: &sqlx::PgPool) -> Result<Self> {
        let job = sqlx::query_as::<_, Self>(&format!(
            r#"
            INSERT INTO jobs (
                id, phase, status, items_processed, items_succeeded, items_failed,
                error_message, started_at, completed_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.phase)
        .bind(self.status)
        .bind(self.items_processed)
        .bind(self.items_succeeded)
        .bind(self.items_failed)
        .bind(&self.error_message)
        .bind(self.started_at)
        .bind(self.completed_at)
        .bind(self.created_at)
        .bind(self.updated_at)
        .fetch_one(db)
        .await?;

        Ok(job)
    }

    async fn update(&self, db: &sqlx::PgPool) -> Result<Self> {
        // Terminal rows are immutable: the WHERE clause refuses to touch
        // completed/failed jobs.
        let job = sqlx::query_as::<_, Self>(&format!(
            r#"
            UPDATE jobs SET
                status = $1, items_processed = $2, items_succeeded = $3, items_failed = $4,
                error_message = $5, started_at = $6, completed_at = $7, updated_at = NOW()
            WHERE id = $8 AND status IN ('pending', 'running')
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(self.status)
        .bind(self.items_processed)
        .bind(self.items_succeeded)
        .bind(self.items_failed)
        .bind(&self.error_message)
        .bind(self.started_at)
        .bind(self.completed_at)
        .bind(self.id)
        .fetch_one(db)
        .await?;

        Ok(job)
    }

    async fn delete(&self, db: &sqlx::PgPool) -> Result<()> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(self.id)
            .execute(db)
            .await?;

        Ok(())
    }
}
