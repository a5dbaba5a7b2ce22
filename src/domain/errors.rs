//! Domain errors for the drawforge pipeline.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur anywhere in the pipeline.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Draw not found for {0}")]
    DrawNotFound(NaiveDate),

    #[error("Invalid draw: {0}")]
    InvalidDraw(String),

    #[error("Execution not found: {0}")]
    ExecutionNotFound(Uuid),

    #[error("A pipeline run is already active: {0}")]
    PipelineBusy(Uuid),

    #[error("All acquisition sources exhausted within budget ({attempts} attempts, {elapsed_ms}ms)")]
    AcquisitionTimeout { attempts: u32, elapsed_ms: u64 },

    // Field is `origin` rather than `source`: thiserror reserves `source`
    // for the error-source chain.
    #[error("Acquisition source '{origin}' failed: {reason}")]
    AcquisitionFailed { origin: String, reason: String },

    #[error("Validation gate failed at step {step}: {reason}")]
    GateFailed { step: String, reason: String },

    #[error("Step '{step}' failed: {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
