//! Statistical core: four independent models over a window of draw history.
//!
//! All models consume draws ordered oldest to newest and degrade to
//! uniform/neutral outputs on empty or insufficient history. Snapshots are
//! ephemeral: recomputed per pipeline run, never persisted as authoritative
//! state.

pub mod gaps;
pub mod momentum;
pub mod patterns;
pub mod temporal;
pub mod window;

pub use gaps::GapAnalysis;
pub use momentum::MomentumScores;
pub use patterns::PatternAnalysis;
pub use temporal::TemporalWeights;
pub use window::adaptive_window;

use crate::domain::models::{Draw, GenerationConfig};

/// All four model snapshots for one pipeline run.
#[derive(Debug, Clone)]
pub struct StatsBundle {
    pub temporal: TemporalWeights,
    pub momentum: MomentumScores,
    pub gaps: GapAnalysis,
    pub patterns: PatternAnalysis,
    /// Window size the snapshots were computed over.
    pub window: usize,
}

impl StatsBundle {
    /// Compute every model over the adaptive window of `draws`.
    pub fn compute(draws: &[Draw], config: &GenerationConfig) -> Self {
        let window = adaptive_window(draws);
        let windowed = &draws[draws.len() - window..];

        Self {
            temporal: TemporalWeights::compute(windowed, config.decay_factor),
            momentum: MomentumScores::compute(windowed, config.short_window, config.long_window),
            gaps: GapAnalysis::compute(windowed),
            patterns: PatternAnalysis::compute(windowed),
            window,
        }
    }
}
