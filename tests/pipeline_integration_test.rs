mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use drawforge::adapters::sqlite::{
    SqliteAnalyticsRepository, SqliteDrawRepository, SqliteExecutionRepository,
    SqlitePerformanceRepository, SqliteTicketRepository,
};
use drawforge::domain::errors::DomainResult;
use drawforge::domain::models::{
    AcquisitionConfig, Draw, ExecutionStatus, GenerationConfig, PipelineOutcome, Ticket,
};
use drawforge::domain::ports::{
    DrawRepository, DrawSource, ExecutionFilter, ExecutionRepository, FixedClock,
    TicketRepository,
};
use drawforge::services::pipeline::{PipelineDependencies, PipelineRunner, RunSlot};

use common::{draw_history, setup_test_db, FixedBulkSource, FixedSource};

// Saturday 2025-01-04 23:30 New York: the drawing has occurred.
fn after_drawing() -> DateTime<Utc> {
    "2025-01-05T04:30:00Z".parse().unwrap()
}

fn target_date() -> NaiveDate {
    "2025-01-04".parse().unwrap()
}

// First drawing day after the resolved Saturday.
fn next_date() -> NaiveDate {
    "2025-01-06".parse().unwrap()
}

fn target_draw() -> Draw {
    Draw::new(target_date(), [5, 12, 23, 40, 61], 9).unwrap()
}

fn small_generation_config() -> GenerationConfig {
    GenerationConfig {
        tickets_per_run: 25,
        batch_size: 10,
        ..GenerationConfig::default()
    }
}

fn dependencies(
    pool: &SqlitePool,
    sources: Vec<Arc<dyn DrawSource>>,
    now: DateTime<Utc>,
) -> PipelineDependencies {
    PipelineDependencies {
        executions: Arc::new(SqliteExecutionRepository::new(pool.clone())),
        draws: Arc::new(SqliteDrawRepository::new(pool.clone())),
        tickets: Arc::new(SqliteTicketRepository::new(pool.clone())),
        performance: Arc::new(SqlitePerformanceRepository::new(pool.clone())),
        analytics: Arc::new(SqliteAnalyticsRepository::new(pool.clone())),
        sources,
        bulk: None,
        clock: Arc::new(FixedClock(now)),
        acquisition_config: AcquisitionConfig::default(),
        generation_config: small_generation_config(),
    }
}

#[tokio::test]
async fn test_full_run_generates_tickets() {
    let pool = setup_test_db().await;
    let draws = SqliteDrawRepository::new(pool.clone());
    draws.bulk_insert(&draw_history(80)).await.unwrap();

    let source = FixedSource::ok("primary", target_draw());
    let runner = PipelineRunner::new(
        dependencies(&pool, vec![source.clone()], after_drawing()),
        RunSlot::new(),
    );

    let report = runner.trigger().await;
    assert!(report.success, "error: {:?}", report.error);
    assert_eq!(report.status, ExecutionStatus::Completed);
    assert_eq!(report.outcome, PipelineOutcome::Generated);
    assert_eq!(report.tickets_generated, Some(25));
    assert_eq!(report.target_draw, Some(next_date()));

    // The official draw landed in the store.
    assert_eq!(draws.get(target_date()).await.unwrap(), Some(target_draw()));

    // The execution record is terminal with full step progress.
    let executions = SqliteExecutionRepository::new(pool.clone());
    let exec = executions.get(report.execution_id).await.unwrap().unwrap();
    assert_eq!(exec.status, ExecutionStatus::Completed);
    assert_eq!(exec.steps_completed, 7);
    assert!(exec.finished_at.is_some());

    // Tickets predict the upcoming drawing, whose result must not exist yet;
    // nothing targets the draw that was just resolved.
    assert_eq!(draws.get(next_date()).await.unwrap(), None);
    let tickets = SqliteTicketRepository::new(pool.clone());
    assert_eq!(tickets.count_for_draw(target_date()).await.unwrap(), 0);
    let stored = tickets.for_draw(next_date(), 100).await.unwrap();
    assert_eq!(stored.len(), 25);
    for ticket in &stored {
        drawforge::domain::models::validate_numbers(&ticket.white, ticket.special).unwrap();
        assert!(!ticket.evaluated);
    }
}

#[tokio::test]
async fn test_rerun_skips_sources_but_still_generates() {
    let pool = setup_test_db().await;
    SqliteDrawRepository::new(pool.clone())
        .bulk_insert(&draw_history(60))
        .await
        .unwrap();

    let source = FixedSource::ok("primary", target_draw());
    let runner = PipelineRunner::new(
        dependencies(&pool, vec![source.clone()], after_drawing()),
        RunSlot::new(),
    );

    let first = runner.trigger().await;
    assert_eq!(first.outcome, PipelineOutcome::Generated);
    let calls_after_first = source.call_count();

    // A stored draw skips acquisition but the rest of the run still happens:
    // the second run regenerates the upcoming drawing's ticket set.
    let second = runner.trigger().await;
    assert!(second.success);
    assert_eq!(second.outcome, PipelineOutcome::Generated);
    assert_eq!(second.tickets_generated, Some(25));
    assert_eq!(source.call_count(), calls_after_first);

    let tickets = SqliteTicketRepository::new(pool.clone());
    assert_eq!(tickets.count_for_draw(next_date()).await.unwrap(), 25);
}

#[tokio::test]
async fn test_presync_stored_draw_does_not_starve_generation() {
    let pool = setup_test_db().await;

    // The bulk file already carries the latest result, so the presence check
    // finds it without any live source traffic. Generation must still run.
    let mut history = draw_history(60);
    history.push(target_draw());
    let source = FixedSource::failing("primary");
    let mut deps = dependencies(&pool, vec![source.clone()], after_drawing());
    deps.bulk = Some(FixedBulkSource::new(history));
    let runner = PipelineRunner::new(deps, RunSlot::new());

    let report = runner.trigger().await;
    assert!(report.success, "error: {:?}", report.error);
    assert_eq!(report.outcome, PipelineOutcome::Generated);
    assert_eq!(report.tickets_generated, Some(25));
    assert_eq!(source.call_count(), 0);

    let tickets = SqliteTicketRepository::new(pool.clone());
    assert_eq!(tickets.count_for_draw(next_date()).await.unwrap(), 25);
}

#[tokio::test]
async fn test_not_ready_exits_without_polling() {
    let pool = setup_test_db().await;
    SqliteDrawRepository::new(pool.clone())
        .bulk_insert(&draw_history(60))
        .await
        .unwrap();

    let source = FixedSource::ok("primary", target_draw());
    // Saturday evening before the 22:59 drawing: the pending result does
    // not exist yet, so the run exits early without touching any source.
    let runner = PipelineRunner::new(
        dependencies(
            &pool,
            vec![source.clone()],
            "2025-01-05T01:00:00Z".parse().unwrap(),
        ),
        RunSlot::new(),
    );

    let report = runner.trigger().await;
    assert!(report.success);
    assert_eq!(report.status, ExecutionStatus::Completed);
    assert_eq!(report.outcome, PipelineOutcome::DrawNotReady);
    assert_eq!(report.tickets_generated, None);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_acquisition_failure_is_critical() {
    let pool = setup_test_db().await;
    SqliteDrawRepository::new(pool.clone())
        .bulk_insert(&draw_history(60))
        .await
        .unwrap();

    let mut config = AcquisitionConfig::default();
    config.attempts_per_source = 1;
    let mut deps = dependencies(
        &pool,
        vec![FixedSource::failing("primary"), FixedSource::failing("backup")],
        after_drawing(),
    );
    deps.acquisition_config = config;
    let runner = PipelineRunner::new(deps, RunSlot::new());

    let report = runner.trigger().await;
    assert!(!report.success);
    assert_eq!(report.outcome, PipelineOutcome::Failed);
    assert_eq!(report.failed_step.as_deref(), Some("acquisition"));

    let exec = SqliteExecutionRepository::new(pool.clone())
        .get(report.execution_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exec.status, ExecutionStatus::Failed);
    assert!(exec.finished_at.is_some());
}

#[tokio::test]
async fn test_budget_exhaustion_finalizes_as_timeout() {
    let pool = setup_test_db().await;
    SqliteDrawRepository::new(pool.clone())
        .bulk_insert(&draw_history(60))
        .await
        .unwrap();

    // A zero budget exhausts before the first attempt.
    let mut deps = dependencies(&pool, vec![FixedSource::failing("primary")], after_drawing());
    deps.acquisition_config.total_budget_secs = 0;
    let runner = PipelineRunner::new(deps, RunSlot::new());

    let report = runner.trigger().await;
    assert!(!report.success);
    assert_eq!(report.status, ExecutionStatus::Timeout);
    assert_eq!(report.outcome, PipelineOutcome::Failed);
    assert_eq!(report.failed_step.as_deref(), Some("acquisition"));

    let exec = SqliteExecutionRepository::new(pool.clone())
        .get(report.execution_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(exec.status, ExecutionStatus::Timeout);
    assert!(exec.finished_at.is_some());
}

#[tokio::test]
async fn test_concurrent_trigger_is_rejected() {
    let pool = setup_test_db().await;
    let slot = RunSlot::new();
    let _held = slot.acquire(Uuid::new_v4()).unwrap();

    let runner = PipelineRunner::new(
        dependencies(
            &pool,
            vec![FixedSource::ok("primary", target_draw())],
            after_drawing(),
        ),
        slot.clone(),
    );

    let report = runner.trigger().await;
    assert!(!report.success);
    assert_eq!(report.outcome, PipelineOutcome::Failed);
    assert!(report.error.unwrap().contains("already active"));

    // No execution record is created for a rejected trigger.
    let executions = SqliteExecutionRepository::new(pool.clone());
    assert!(executions
        .list(ExecutionFilter::default())
        .await
        .unwrap()
        .is_empty());
}

/// Delegating ticket repository that under-reports inserts, simulating rows
/// silently dropped by constraint conflicts.
struct ShortedTicketRepository {
    inner: SqliteTicketRepository,
}

#[async_trait]
impl TicketRepository for ShortedTicketRepository {
    async fn insert_batch(&self, tickets: &[Ticket]) -> DomainResult<u64> {
        let inserted = self.inner.insert_batch(tickets).await?;
        Ok(inserted.saturating_sub(1))
    }

    async fn delete_for_draw(&self, date: NaiveDate) -> DomainResult<u64> {
        self.inner.delete_for_draw(date).await
    }

    async fn unevaluated_draw_dates(&self, limit: usize) -> DomainResult<Vec<NaiveDate>> {
        self.inner.unevaluated_draw_dates(limit).await
    }

    async fn unevaluated_for_draw(&self, date: NaiveDate) -> DomainResult<Vec<Ticket>> {
        self.inner.unevaluated_for_draw(date).await
    }

    async fn mark_evaluated(
        &self,
        id: Uuid,
        matches_main: u8,
        matches_special: bool,
        prize_amount: f64,
    ) -> DomainResult<()> {
        self.inner
            .mark_evaluated(id, matches_main, matches_special, prize_amount)
            .await
    }

    async fn count_for_draw(&self, date: NaiveDate) -> DomainResult<u64> {
        self.inner.count_for_draw(date).await
    }

    async fn for_draw(&self, date: NaiveDate, limit: usize) -> DomainResult<Vec<Ticket>> {
        self.inner.for_draw(date, limit).await
    }
}

#[tokio::test]
async fn test_ticket_count_mismatch_fails_generation_gate() {
    let pool = setup_test_db().await;
    SqliteDrawRepository::new(pool.clone())
        .bulk_insert(&draw_history(60))
        .await
        .unwrap();

    let mut deps = dependencies(
        &pool,
        vec![FixedSource::ok("primary", target_draw())],
        after_drawing(),
    );
    deps.tickets = Arc::new(ShortedTicketRepository {
        inner: SqliteTicketRepository::new(pool.clone()),
    });
    let runner = PipelineRunner::new(deps, RunSlot::new());

    let report = runner.trigger().await;
    assert!(!report.success);
    assert_eq!(report.failed_step.as_deref(), Some("generation"));
    assert!(report.error.unwrap().contains("mismatch"));
}
