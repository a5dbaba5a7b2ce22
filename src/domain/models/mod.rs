//! Domain models for the drawforge pipeline.

pub mod config;
pub mod draw;
pub mod execution;
pub mod strategy;

pub use config::{AcquisitionConfig, Config, DatabaseConfig, GenerationConfig, LoggingConfig};
pub use draw::{validate_numbers, Draw, StrategyKind, Ticket, SPECIAL_MAX, WHITE_COUNT, WHITE_MAX};
pub use execution::{
    ExecutionStats, ExecutionStatus, PipelineExecution, PipelineOutcome, PipelineReport,
    TOTAL_STEPS,
};
pub use strategy::StrategyPerformance;
