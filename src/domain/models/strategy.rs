//! Strategy performance tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::draw::StrategyKind;

/// Cumulative win-rate record for one generation strategy.
///
/// `weight` is this strategy's share of the generation mix; across all
/// tracked strategies the weights sum to 1. `confidence` grows with play
/// count and is clamped to [0.1, 0.95]. Only the adaptive weighting engine
/// mutates these rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub strategy: StrategyKind,
    pub plays: u64,
    pub wins: u64,
    pub weight: f64,
    pub confidence: f64,
    pub updated_at: DateTime<Utc>,
}

impl StrategyPerformance {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            plays: 0,
            wins: 0,
            weight: 1.0 / StrategyKind::ALL.len() as f64,
            confidence: 0.1,
            updated_at: Utc::now(),
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.plays == 0 {
            0.0
        } else {
            self.wins as f64 / self.plays as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_performance_uniform_weight() {
        let perf = StrategyPerformance::new(StrategyKind::Momentum);
        assert!((perf.weight - 0.2).abs() < 1e-12);
        assert_eq!(perf.confidence, 0.1);
        assert_eq!(perf.win_rate(), 0.0);
    }

    #[test]
    fn test_win_rate() {
        let mut perf = StrategyPerformance::new(StrategyKind::Pattern);
        perf.plays = 10;
        perf.wins = 3;
        assert!((perf.win_rate() - 0.3).abs() < 1e-12);
    }
}
