//! Pipeline execution records.
//!
//! One `PipelineExecution` per end-to-end run. Terminal states are final;
//! execution ids are never reused.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Total number of pipeline steps.
pub const TOTAL_STEPS: u8 = 7;

/// Status of a pipeline execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Timeout,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Mutable record of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineExecution {
    pub id: Uuid,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub current_step: String,
    pub steps_completed: u8,
    pub total_steps: u8,
    pub metadata: serde_json::Value,
    pub error: Option<String>,
    pub tickets_generated: Option<u32>,
    pub target_draw_date: Option<NaiveDate>,
}

impl PipelineExecution {
    pub fn start() -> Self {
        Self {
            id: Uuid::new_v4(),
            status: ExecutionStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            current_step: String::new(),
            steps_completed: 0,
            total_steps: TOTAL_STEPS,
            metadata: serde_json::json!({}),
            error: None,
            tickets_generated: None,
            target_draw_date: None,
        }
    }

    /// Advance to a step. `steps_completed` is monotonically non-decreasing.
    pub fn advance(&mut self, step: &str, completed: u8) {
        self.current_step = step.to_string();
        if completed > self.steps_completed {
            self.steps_completed = completed;
        }
    }

    pub fn finalize(&mut self, status: ExecutionStatus, error: Option<String>) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.error = error;
        self.finished_at = Some(Utc::now());
    }

    pub fn elapsed_seconds(&self) -> f64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// How a run ended, distinct from whether it hit a critical failure.
///
/// `DrawNotReady` (the drawing time has not passed) is a successful outcome
/// that skips everything after the presence check; only `Failed` carries a
/// failing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOutcome {
    Generated,
    DrawNotReady,
    Failed,
}

impl PipelineOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::DrawNotReady => "draw_not_ready",
            Self::Failed => "failed",
        }
    }
}

/// Result record returned by the pipeline trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub success: bool,
    pub status: ExecutionStatus,
    pub outcome: PipelineOutcome,
    pub execution_id: Uuid,
    pub elapsed_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets_generated: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_draw: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate statistics over past executions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub success_rate: f64,
    pub avg_duration_seconds: f64,
}
