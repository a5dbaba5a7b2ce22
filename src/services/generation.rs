//! Ticket generation for one target drawing.
//!
//! Allocates the per-run ticket count across strategies by their current
//! weights, samples candidates, assigns confidence, and persists in fixed
//! size batches so memory stays bounded at the batch size.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::domain::errors::DomainResult;
use crate::domain::models::{GenerationConfig, StrategyKind, Ticket};
use crate::domain::ports::{DrawRepository, TicketRepository};
use crate::services::scoring::{summarize, ScoringEngine, TicketScore};
use crate::services::stats::StatsBundle;
use crate::services::weighting::allocate_tickets;

/// History fetched for statistics; covers the maximum adaptive window and
/// the similarity lookback.
const HISTORY_FETCH: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct GenerationOutcome {
    pub expected: usize,
    pub persisted: u64,
    /// Stale tickets for the target date removed before generating.
    pub replaced: u64,
}

pub struct GenerationService {
    draws: Arc<dyn DrawRepository>,
    tickets: Arc<dyn TicketRepository>,
    config: GenerationConfig,
}

impl GenerationService {
    pub fn new(
        draws: Arc<dyn DrawRepository>,
        tickets: Arc<dyn TicketRepository>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            draws,
            tickets,
            config,
        }
    }

    /// Generate the full ticket set for `target`, replacing any unevaluated
    /// tickets a previous run left for the same date.
    pub async fn generate_for(
        &self,
        target: NaiveDate,
        weights: &HashMap<StrategyKind, f64>,
    ) -> DomainResult<GenerationOutcome> {
        let mut rng = StdRng::from_os_rng();
        self.generate_with_rng(target, weights, &mut rng).await
    }

    pub async fn generate_with_rng<R: Rng>(
        &self,
        target: NaiveDate,
        weights: &HashMap<StrategyKind, f64>,
        rng: &mut R,
    ) -> DomainResult<GenerationOutcome> {
        let replaced = self.tickets.delete_for_draw(target).await?;
        if replaced > 0 {
            debug!(date = %target, replaced, "replaced stale tickets");
        }

        let history = self.draws.recent(HISTORY_FETCH).await?;
        let stats = StatsBundle::compute(&history, &self.config);
        let engine = ScoringEngine::new(&stats.patterns, &history);

        let allocation = allocate_tickets(weights, self.config.tickets_per_run as usize);
        let batch_size = self.config.batch_size as usize;
        let mut persisted = 0u64;
        let mut batch: Vec<Ticket> = Vec::with_capacity(batch_size);
        let mut scores: Vec<TicketScore> = Vec::with_capacity(batch_size);

        for (strategy, count) in allocation {
            let weight = weights.get(&strategy).copied().unwrap_or(0.0);
            for candidate in strategy.generate(&stats, &self.config, count, rng) {
                let score = engine.score(&candidate.white);
                let confidence = ticket_confidence(score.overall, weight);
                batch.push(Ticket::new(
                    target,
                    strategy,
                    candidate.white,
                    candidate.special,
                    confidence,
                ));
                scores.push(score);

                if batch.len() >= batch_size {
                    persisted += self.tickets.insert_batch(&batch).await?;
                    log_score_summary(&scores);
                    batch.clear();
                    scores.clear();
                }
            }
        }
        if !batch.is_empty() {
            persisted += self.tickets.insert_batch(&batch).await?;
            log_score_summary(&scores);
        }
        info!(date = %target, persisted, window = stats.window, "tickets generated");
        Ok(GenerationOutcome {
            expected: self.config.tickets_per_run as usize,
            persisted,
            replaced,
        })
    }
}

/// One batch worth of score distribution, logged as the batch is dropped.
fn log_score_summary(scores: &[TicketScore]) {
    if let Some(summary) = summarize(scores) {
        debug!(
            batch = scores.len(),
            overall_mean = summary.overall.mean,
            overall_min = summary.overall.min,
            pattern_mean = summary.pattern.mean,
            "ticket score distribution"
        );
    }
}

/// Blend of combination quality and the producing strategy's relative weight
/// (scaled so the uniform weight maps to 1).
fn ticket_confidence(overall_score: f64, strategy_weight: f64) -> f64 {
    let relative = (strategy_weight * StrategyKind::ALL.len() as f64).min(1.0);
    (0.7 * overall_score + 0.3 * relative).clamp(0.0, 1.0)
}
