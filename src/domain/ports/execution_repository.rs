//! Port for the pipeline execution log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ExecutionStats, ExecutionStatus, PipelineExecution};

/// Filter for querying past executions.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    pub status: Option<ExecutionStatus>,
    pub started_after: Option<DateTime<Utc>>,
    pub started_before: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    async fn create(&self, exec: &PipelineExecution) -> DomainResult<()>;

    /// Persist the current state of a run (step advance, metadata, finals).
    async fn update(&self, exec: &PipelineExecution) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<PipelineExecution>>;

    async fn list(&self, filter: ExecutionFilter) -> DomainResult<Vec<PipelineExecution>>;

    /// Executions still marked running.
    async fn running(&self) -> DomainResult<Vec<PipelineExecution>>;

    /// Recovery sweep: mark every `running` execution failed with the given
    /// reason and a non-null end time. Returns the number swept.
    async fn mark_stuck_failed(&self, reason: &str) -> DomainResult<u64>;

    /// Aggregate success rate and average duration over finished runs.
    async fn stats(&self) -> DomainResult<ExecutionStats>;
}
