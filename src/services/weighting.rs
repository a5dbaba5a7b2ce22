//! Adaptive strategy weighting from historical win rates.
//!
//! Weights are recomputed from the performance ledger before every
//! generation run and persisted, so allocation always reflects the latest
//! evaluated results.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{StrategyKind, StrategyPerformance};
use crate::domain::ports::PerformanceRepository;

/// Floor added to every raw rate so a winless strategy keeps a small
/// allocation and can recover.
const EXPLORATION_FLOOR: f64 = 0.01;
/// Raw rate assigned to a strategy with no recorded plays.
const UNPLAYED_RATE: f64 = 0.01;
/// Confidence saturates below this ceiling regardless of sample size.
const CONFIDENCE_CEILING: f64 = 0.95;
const CONFIDENCE_BASE: f64 = 0.1;
/// Half-saturation sample size for confidence growth.
const CONFIDENCE_SCALE: f64 = 100.0;

pub struct WeightingService {
    performance: Arc<dyn PerformanceRepository>,
}

impl WeightingService {
    pub fn new(performance: Arc<dyn PerformanceRepository>) -> Self {
        Self { performance }
    }

    /// Recompute, persist, and return the normalized per-strategy weights.
    pub async fn refresh(&self) -> DomainResult<HashMap<StrategyKind, f64>> {
        let ledger = self.performance.all().await?;
        let by_strategy: HashMap<StrategyKind, &StrategyPerformance> =
            ledger.iter().map(|p| (p.strategy, p)).collect();

        let raw: Vec<(StrategyKind, f64, u64)> = StrategyKind::ALL
            .iter()
            .map(|&strategy| match by_strategy.get(&strategy) {
                Some(perf) if perf.plays > 0 => {
                    (strategy, perf.win_rate() + EXPLORATION_FLOOR, perf.plays)
                }
                _ => (strategy, UNPLAYED_RATE + EXPLORATION_FLOOR, 0),
            })
            .collect();

        let total: f64 = raw.iter().map(|(_, r, _)| r).sum();
        let uniform = 1.0 / StrategyKind::ALL.len() as f64;

        let mut weights = HashMap::new();
        let now = Utc::now();
        for (strategy, rate, plays) in raw {
            let weight = if total > 0.0 { rate / total } else { uniform };
            let confidence = confidence(plays);
            weights.insert(strategy, weight);

            let existing = by_strategy.get(&strategy);
            let record = StrategyPerformance {
                strategy,
                plays,
                wins: existing.map(|p| p.wins).unwrap_or(0),
                weight,
                confidence,
                updated_at: now,
            };
            self.performance.upsert(&record).await?;
            debug!(
                strategy = strategy.as_str(),
                weight, confidence, plays, "strategy weight refreshed"
            );
        }

        validate_weights(&weights)?;
        Ok(weights)
    }
}

/// Confidence grows with sample size and saturates: base + n / (n + scale).
pub fn confidence(plays: u64) -> f64 {
    let n = plays as f64;
    (CONFIDENCE_BASE + n / (n + CONFIDENCE_SCALE)).min(CONFIDENCE_CEILING)
}

/// Every weight must lie in [0, 1] and the set must sum to ~1.
pub fn validate_weights(weights: &HashMap<StrategyKind, f64>) -> DomainResult<()> {
    for (strategy, &w) in weights {
        if !(0.0..=1.0).contains(&w) || !w.is_finite() {
            return Err(DomainError::ValidationFailed(format!(
                "weight for {} out of range: {}",
                strategy, w
            )));
        }
    }
    let total: f64 = weights.values().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(DomainError::ValidationFailed(format!(
            "strategy weights sum to {} instead of 1",
            total
        )));
    }
    Ok(())
}

/// Split `total` tickets across strategies proportionally to their weights,
/// assigning remainders to the heaviest strategies so counts always add up.
pub fn allocate_tickets(
    weights: &HashMap<StrategyKind, f64>,
    total: usize,
) -> Vec<(StrategyKind, usize)> {
    let mut allocation: Vec<(StrategyKind, usize, f64)> = StrategyKind::ALL
        .iter()
        .map(|&strategy| {
            let weight = weights.get(&strategy).copied().unwrap_or(0.0);
            let exact = weight * total as f64;
            (strategy, exact.floor() as usize, exact.fract())
        })
        .collect();

    let assigned: usize = allocation.iter().map(|(_, c, _)| c).sum();
    let mut remainder = total.saturating_sub(assigned);

    allocation.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    for entry in allocation.iter_mut() {
        if remainder == 0 {
            break;
        }
        entry.1 += 1;
        remainder -= 1;
    }

    allocation
        .into_iter()
        .map(|(strategy, count, _)| (strategy, count))
        .collect()
}
