//! Ticket evaluation against official results.
//!
//! Evaluation runs inside the pipeline after a new draw lands: every stored
//! ticket whose draw has an official result is matched, priced, and marked,
//! and the outcome feeds the strategy performance ledger.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Draw, Ticket, WHITE_COUNT};
use crate::domain::ports::{DrawRepository, PerformanceRepository, TicketRepository};

/// Most recent unevaluated draw dates processed per run.
const MAX_DRAWS_PER_RUN: usize = 100;
/// Advisory wall-clock budget; checked between draws, never mid-draw.
const TIME_BUDGET_SECS: u64 = 300;

/// Jackpot prizes are reported as at-least this amount.
pub const JACKPOT_FLOOR: f64 = 20_000_000.0;

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationSummary {
    pub draws_processed: usize,
    pub tickets_evaluated: u64,
    pub winners: u64,
    pub total_prizes: f64,
    /// True when the time budget expired with draws still pending.
    pub truncated: bool,
}

pub struct EvaluationService {
    draws: Arc<dyn DrawRepository>,
    tickets: Arc<dyn TicketRepository>,
    performance: Arc<dyn PerformanceRepository>,
}

impl EvaluationService {
    pub fn new(
        draws: Arc<dyn DrawRepository>,
        tickets: Arc<dyn TicketRepository>,
        performance: Arc<dyn PerformanceRepository>,
    ) -> Self {
        Self {
            draws,
            tickets,
            performance,
        }
    }

    /// Evaluate pending tickets for the most recent draws with results.
    ///
    /// Each ticket is committed individually, so an interrupted run never
    /// re-evaluates what it already marked.
    pub async fn run(&self) -> DomainResult<EvaluationSummary> {
        let started = Instant::now();
        let mut summary = EvaluationSummary::default();

        let pending = self.tickets.unevaluated_draw_dates(MAX_DRAWS_PER_RUN).await?;
        for (i, date) in pending.iter().enumerate() {
            if started.elapsed().as_secs() >= TIME_BUDGET_SECS {
                warn!(
                    remaining = pending.len() - i,
                    "evaluation time budget expired, deferring remaining draws"
                );
                summary.truncated = true;
                break;
            }

            let Some(draw) = self.draws.get(*date).await? else {
                continue;
            };
            self.evaluate_draw(&draw, &mut summary).await?;
            summary.draws_processed += 1;
        }

        info!(
            draws = summary.draws_processed,
            tickets = summary.tickets_evaluated,
            winners = summary.winners,
            "evaluation pass complete"
        );
        Ok(summary)
    }

    async fn evaluate_draw(&self, draw: &Draw, summary: &mut EvaluationSummary) -> DomainResult<()> {
        let tickets = self.tickets.unevaluated_for_draw(draw.date).await?;
        for ticket in tickets {
            let outcome = match_ticket(&ticket, draw);
            let prize = prize_amount(outcome.matches_main, outcome.matches_special);

            self.tickets
                .mark_evaluated(ticket.id, outcome.matches_main, outcome.matches_special, prize)
                .await?;
            self.performance
                .record_result(ticket.strategy, prize > 0.0)
                .await?;

            summary.tickets_evaluated += 1;
            if prize > 0.0 {
                summary.winners += 1;
                summary.total_prizes += prize;
                debug!(
                    ticket = %ticket.id,
                    strategy = ticket.strategy.as_str(),
                    matches_main = outcome.matches_main,
                    matches_special = outcome.matches_special,
                    prize,
                    "winning ticket"
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchOutcome {
    pub matches_main: u8,
    pub matches_special: bool,
}

pub fn match_ticket(ticket: &Ticket, draw: &Draw) -> MatchOutcome {
    let matches_main = ticket
        .white
        .iter()
        .filter(|n| draw.white.contains(n))
        .count() as u8;
    MatchOutcome {
        matches_main,
        matches_special: ticket.special == draw.special,
    }
}

/// Fixed prize schedule. The jackpot varies by rollover, so the top tier
/// reports the advertised floor.
pub fn prize_amount(matches_main: u8, matches_special: bool) -> f64 {
    debug_assert!(matches_main as usize <= WHITE_COUNT);
    match (matches_main, matches_special) {
        (5, true) => JACKPOT_FLOOR,
        (5, false) => 1_000_000.0,
        (4, true) => 50_000.0,
        (4, false) => 100.0,
        (3, true) => 100.0,
        (3, false) => 7.0,
        (2, true) => 7.0,
        (1, true) => 4.0,
        (0, true) => 4.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        all_embedded_migrations, create_test_pool, Migrator, SqliteDrawRepository,
        SqlitePerformanceRepository, SqliteTicketRepository,
    };
    use crate::domain::models::StrategyKind;
    use chrono::NaiveDate;

    #[test]
    fn test_prize_schedule() {
        assert_eq!(prize_amount(5, true), JACKPOT_FLOOR);
        assert_eq!(prize_amount(5, false), 1_000_000.0);
        assert_eq!(prize_amount(4, true), 50_000.0);
        assert_eq!(prize_amount(4, false), 100.0);
        assert_eq!(prize_amount(3, true), 100.0);
        assert_eq!(prize_amount(3, false), 7.0);
        assert_eq!(prize_amount(2, true), 7.0);
        assert_eq!(prize_amount(2, false), 0.0);
        assert_eq!(prize_amount(1, true), 4.0);
        assert_eq!(prize_amount(1, false), 0.0);
        assert_eq!(prize_amount(0, true), 4.0);
        assert_eq!(prize_amount(0, false), 0.0);
    }

    #[test]
    fn test_match_counting() {
        let date = "2025-01-04".parse::<NaiveDate>().unwrap();
        let draw = Draw::new(date, [5, 12, 23, 40, 61], 9).unwrap();
        let ticket = Ticket::new(date, StrategyKind::Hybrid, [5, 12, 30, 40, 69], 9, 0.5);

        let outcome = match_ticket(&ticket, &draw);
        assert_eq!(outcome.matches_main, 3);
        assert!(outcome.matches_special);
    }

    async fn evaluation_fixture() -> (
        EvaluationService,
        Arc<SqliteDrawRepository>,
        Arc<SqliteTicketRepository>,
        Arc<SqlitePerformanceRepository>,
    ) {
        let pool = create_test_pool().await.unwrap();
        Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .unwrap();
        let draws = Arc::new(SqliteDrawRepository::new(pool.clone()));
        let tickets = Arc::new(SqliteTicketRepository::new(pool.clone()));
        let performance = Arc::new(SqlitePerformanceRepository::new(pool));
        let service = EvaluationService::new(draws.clone(), tickets.clone(), performance.clone());
        (service, draws, tickets, performance)
    }

    #[tokio::test]
    async fn test_evaluation_marks_and_records() {
        let (service, draws, tickets, performance) = evaluation_fixture().await;
        let date = "2025-01-04".parse::<NaiveDate>().unwrap();
        let draw = Draw::new(date, [5, 12, 23, 40, 61], 9).unwrap();
        draws.insert(&draw).await.unwrap();

        // 3 mains + special: 100.0. No matches at all: 0.0.
        let winner = Ticket::new(date, StrategyKind::Momentum, [5, 12, 23, 50, 69], 9, 0.5);
        let loser = Ticket::new(date, StrategyKind::GapTheory, [1, 2, 3, 4, 6], 10, 0.5);
        tickets
            .insert_batch(&[winner.clone(), loser.clone()])
            .await
            .unwrap();

        let summary = service.run().await.unwrap();
        assert_eq!(summary.draws_processed, 1);
        assert_eq!(summary.tickets_evaluated, 2);
        assert_eq!(summary.winners, 1);
        assert_eq!(summary.total_prizes, 100.0);
        assert!(!summary.truncated);

        // The ledger saw one win and one loss.
        let ledger = performance.all().await.unwrap();
        let momentum = ledger
            .iter()
            .find(|p| p.strategy == StrategyKind::Momentum)
            .unwrap();
        assert_eq!((momentum.plays, momentum.wins), (1, 1));
        let gap = ledger
            .iter()
            .find(|p| p.strategy == StrategyKind::GapTheory)
            .unwrap();
        assert_eq!((gap.plays, gap.wins), (1, 0));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let (service, draws, tickets, performance) = evaluation_fixture().await;
        let date = "2025-01-04".parse::<NaiveDate>().unwrap();
        let draw = Draw::new(date, [5, 12, 23, 40, 61], 9).unwrap();
        draws.insert(&draw).await.unwrap();
        tickets
            .insert_batch(&[Ticket::new(
                date,
                StrategyKind::Pattern,
                [5, 12, 23, 40, 61],
                9,
                0.9,
            )])
            .await
            .unwrap();

        service.run().await.unwrap();
        let second = service.run().await.unwrap();
        assert_eq!(second.tickets_evaluated, 0);

        let ledger = performance.all().await.unwrap();
        let pattern = ledger
            .iter()
            .find(|p| p.strategy == StrategyKind::Pattern)
            .unwrap();
        assert_eq!(pattern.plays, 1);
    }

    #[tokio::test]
    async fn test_draw_without_result_is_skipped() {
        let (service, _, tickets, _) = evaluation_fixture().await;
        let date = "2025-02-01".parse::<NaiveDate>().unwrap();
        tickets
            .insert_batch(&[Ticket::new(
                date,
                StrategyKind::Hybrid,
                [1, 2, 3, 4, 5],
                6,
                0.5,
            )])
            .await
            .unwrap();

        let summary = service.run().await.unwrap();
        assert_eq!(summary.draws_processed, 0);
        assert_eq!(summary.tickets_evaluated, 0);
    }
}
