//! Derived analytics refresh: white-ball co-occurrence counts plus the
//! pattern aggregates over the adaptive window.
//!
//! Recomputed from stored draw history after every new result lands. Both
//! outputs are derived state and safe to rebuild from scratch.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::models::Draw;
use crate::domain::ports::{AnalyticsRepository, DrawRepository, PairCount};
use crate::services::stats::{adaptive_window, PatternAnalysis};

/// Draws considered for co-occurrence; generous enough to cover the full
/// modern-format history.
const ANALYTICS_LOOKBACK: usize = 5_000;

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub draws_analyzed: usize,
    pub pairs_stored: usize,
    /// Adaptive window the pattern aggregates were computed over.
    pub pattern_window: usize,
    pub sum_mean: f64,
    pub sum_std: f64,
}

pub struct AnalyticsService {
    draws: Arc<dyn DrawRepository>,
    analytics: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsService {
    pub fn new(draws: Arc<dyn DrawRepository>, analytics: Arc<dyn AnalyticsRepository>) -> Self {
        Self { draws, analytics }
    }

    /// Rebuild the co-occurrence table and pattern aggregates from stored
    /// history.
    pub async fn refresh(&self) -> DomainResult<AnalyticsSummary> {
        let draws = self.draws.recent(ANALYTICS_LOOKBACK).await?;
        let pairs = pair_counts(&draws);
        self.analytics.replace_cooccurrence(&pairs).await?;

        let window = adaptive_window(&draws);
        let patterns = PatternAnalysis::compute(&draws[draws.len() - window..]);

        info!(
            draws = draws.len(),
            pairs = pairs.len(),
            window,
            "analytics refreshed"
        );
        Ok(AnalyticsSummary {
            draws_analyzed: draws.len(),
            pairs_stored: pairs.len(),
            pattern_window: window,
            sum_mean: patterns.sum_mean,
            sum_std: patterns.sum_std,
        })
    }
}

/// Count every unordered white-ball pair across the given draws.
pub fn pair_counts(draws: &[Draw]) -> Vec<PairCount> {
    let mut counts: HashMap<(u8, u8), u64> = HashMap::new();
    for draw in draws {
        for i in 0..draw.white.len() {
            for j in (i + 1)..draw.white.len() {
                let (a, b) = if draw.white[i] < draw.white[j] {
                    (draw.white[i], draw.white[j])
                } else {
                    (draw.white[j], draw.white[i])
                };
                *counts.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<PairCount> = counts
        .into_iter()
        .map(|((a, b), count)| PairCount { a, b, count })
        .collect();
    pairs.sort_by_key(|p| (p.a, p.b));
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        all_embedded_migrations, create_test_pool, Migrator, SqliteAnalyticsRepository,
        SqliteDrawRepository,
    };
    use chrono::NaiveDate;

    fn draw(date: &str, white: [u8; 5], special: u8) -> Draw {
        Draw::new(date.parse::<NaiveDate>().unwrap(), white, special).unwrap()
    }

    #[test]
    fn test_pair_counts_per_draw() {
        // One 5-number draw yields C(5,2) = 10 pairs.
        let pairs = pair_counts(&[draw("2025-01-04", [1, 2, 3, 4, 5], 6)]);
        assert_eq!(pairs.len(), 10);
        assert!(pairs.iter().all(|p| p.count == 1 && p.a < p.b));
    }

    #[test]
    fn test_repeated_pair_accumulates() {
        let draws = vec![
            draw("2025-01-01", [1, 2, 30, 40, 50], 6),
            draw("2025-01-04", [1, 2, 31, 41, 51], 7),
        ];
        let pairs = pair_counts(&draws);
        let pair_1_2 = pairs.iter().find(|p| p.a == 1 && p.b == 2).unwrap();
        assert_eq!(pair_1_2.count, 2);
    }

    #[tokio::test]
    async fn test_refresh_persists_pairs() {
        let pool = create_test_pool().await.unwrap();
        Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .unwrap();
        let draws = Arc::new(SqliteDrawRepository::new(pool.clone()));
        let analytics = Arc::new(SqliteAnalyticsRepository::new(pool));

        draws
            .insert(&draw("2025-01-04", [5, 12, 23, 40, 61], 9))
            .await
            .unwrap();

        let service = AnalyticsService::new(draws, analytics.clone());
        let summary = service.refresh().await.unwrap();
        assert_eq!(summary.draws_analyzed, 1);
        assert_eq!(summary.pairs_stored, 10);
        assert_eq!(summary.pattern_window, 1);
        assert!((summary.sum_mean - 141.0).abs() < 1e-9);
        assert_eq!(analytics.cooccurrence_size().await.unwrap(), 10);
    }
}
