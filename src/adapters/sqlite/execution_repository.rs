//! SQLite implementation of the ExecutionRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ExecutionStats, ExecutionStatus, PipelineExecution};
use crate::domain::ports::{ExecutionFilter, ExecutionRepository};

#[derive(Clone)]
pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn create(&self, exec: &PipelineExecution) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO pipeline_executions (id, status, started_at, finished_at, current_step,
               steps_completed, total_steps, metadata, error, tickets_generated, target_draw_date)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(exec.id.to_string())
        .bind(exec.status.as_str())
        .bind(exec.started_at.to_rfc3339())
        .bind(exec.finished_at.map(|t| t.to_rfc3339()))
        .bind(&exec.current_step)
        .bind(exec.steps_completed as i32)
        .bind(exec.total_steps as i32)
        .bind(exec.metadata.to_string())
        .bind(&exec.error)
        .bind(exec.tickets_generated.map(|n| n as i64))
        .bind(exec.target_draw_date.map(|d| d.to_string()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, exec: &PipelineExecution) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE pipeline_executions SET status = ?, finished_at = ?, current_step = ?,
               steps_completed = ?, metadata = ?, error = ?, tickets_generated = ?,
               target_draw_date = ?
               WHERE id = ?"#,
        )
        .bind(exec.status.as_str())
        .bind(exec.finished_at.map(|t| t.to_rfc3339()))
        .bind(&exec.current_step)
        .bind(exec.steps_completed as i32)
        .bind(exec.metadata.to_string())
        .bind(&exec.error)
        .bind(exec.tickets_generated.map(|n| n as i64))
        .bind(exec.target_draw_date.map(|d| d.to_string()))
        .bind(exec.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ExecutionNotFound(exec.id));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<PipelineExecution>> {
        let row: Option<ExecutionRow> =
            sqlx::query_as("SELECT * FROM pipeline_executions WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, filter: ExecutionFilter) -> DomainResult<Vec<PipelineExecution>> {
        let mut query = String::from("SELECT * FROM pipeline_executions WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(status) = &filter.status {
            query.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(after) = &filter.started_after {
            query.push_str(" AND started_at >= ?");
            bindings.push(after.to_rfc3339());
        }
        if let Some(before) = &filter.started_before {
            query.push_str(" AND started_at <= ?");
            bindings.push(before.to_rfc3339());
        }

        query.push_str(" ORDER BY started_at DESC");
        if let Some(limit) = filter.limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }

        let mut q = sqlx::query_as::<_, ExecutionRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<ExecutionRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn running(&self) -> DomainResult<Vec<PipelineExecution>> {
        self.list(ExecutionFilter {
            status: Some(ExecutionStatus::Running),
            ..Default::default()
        })
        .await
    }

    async fn mark_stuck_failed(&self, reason: &str) -> DomainResult<u64> {
        let result = sqlx::query(
            "UPDATE pipeline_executions SET status = 'failed', error = ?, finished_at = ?
             WHERE status = 'running'",
        )
        .bind(reason)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn stats(&self) -> DomainResult<ExecutionStats> {
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"SELECT COUNT(*),
                      COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                      COALESCE(SUM(CASE WHEN status IN ('failed', 'timeout') THEN 1 ELSE 0 END), 0)
               FROM pipeline_executions WHERE status != 'running'"#,
        )
        .fetch_one(&self.pool)
        .await?;

        let (total, completed, failed) = row;

        // Average duration over finished runs with both timestamps.
        let avg: (Option<f64>,) = sqlx::query_as(
            r#"SELECT AVG((julianday(finished_at) - julianday(started_at)) * 86400.0)
               FROM pipeline_executions
               WHERE finished_at IS NOT NULL"#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ExecutionStats {
            total: total as u64,
            completed: completed as u64,
            failed: failed as u64,
            success_rate: if total > 0 {
                completed as f64 / total as f64
            } else {
                0.0
            },
            avg_duration_seconds: avg.0.unwrap_or(0.0),
        })
    }
}

#[derive(sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    status: String,
    started_at: String,
    finished_at: Option<String>,
    current_step: String,
    steps_completed: i32,
    total_steps: i32,
    metadata: String,
    error: Option<String>,
    tickets_generated: Option<i64>,
    target_draw_date: Option<String>,
}

impl TryFrom<ExecutionRow> for PipelineExecution {
    type Error = DomainError;

    fn try_from(row: ExecutionRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;
        let status = ExecutionStatus::from_str(&row.status).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid status: {}", row.status))
        })?;
        let started_at = parse_rfc3339(&row.started_at)?;
        let finished_at = row.finished_at.as_deref().map(parse_rfc3339).transpose()?;
        let metadata: serde_json::Value = serde_json::from_str(&row.metadata)?;
        let target_draw_date = row
            .target_draw_date
            .map(|s| s.parse::<NaiveDate>())
            .transpose()
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;

        Ok(PipelineExecution {
            id,
            status,
            started_at,
            finished_at,
            current_step: row.current_step,
            steps_completed: row.steps_completed as u8,
            total_steps: row.total_steps as u8,
            metadata,
            error: row.error,
            tickets_generated: row.tickets_generated.map(|n| n as u32),
            target_draw_date,
        })
    }
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, DomainError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}
