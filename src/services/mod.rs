//! Service layer: statistics, generation, evaluation, and the pipeline
//! orchestrator that ties them together.

pub mod acquisition;
pub mod analytics;
pub mod evaluation;
pub mod generation;
pub mod pipeline;
pub mod scoring;
pub mod stats;
pub mod strategies;
pub mod weighting;

pub use acquisition::{AcquisitionPoller, PollOutcome};
pub use analytics::AnalyticsService;
pub use evaluation::EvaluationService;
pub use generation::GenerationService;
pub use pipeline::{PipelineDependencies, PipelineRunner, RunSlot};
pub use scoring::ScoringEngine;
pub use stats::StatsBundle;
pub use weighting::WeightingService;
