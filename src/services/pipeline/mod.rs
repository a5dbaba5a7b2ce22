//! Pipeline orchestrator: the single end-to-end run triggered per drawing.
//!
//! Seven ordered steps, each recorded in the execution log as it happens.
//! Critical step failures finalize the run as failed and skip everything
//! after them; non-critical failures are recorded and the run continues.

pub mod recovery;
pub mod steps;

pub use recovery::{install_signal_handler, recover_stuck_executions, RunGuard, RunSlot};
pub use steps::{StepOutcome, STEP_NAMES};

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AcquisitionConfig, Draw, ExecutionStatus, GenerationConfig, PipelineExecution,
    PipelineOutcome, PipelineReport,
};
use crate::domain::ports::{
    AnalyticsRepository, BulkDrawSource, DrawRepository, DrawSource, ExecutionRepository,
    LotteryClock, PerformanceRepository, TicketRepository,
};
use crate::services::acquisition::{AcquisitionPoller, PollOutcome};
use crate::services::analytics::AnalyticsService;
use crate::services::evaluation::EvaluationService;
use crate::services::generation::GenerationService;
use crate::services::weighting::WeightingService;

/// Everything a pipeline run needs; wired once at startup.
pub struct PipelineDependencies {
    pub executions: Arc<dyn ExecutionRepository>,
    pub draws: Arc<dyn DrawRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub performance: Arc<dyn PerformanceRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
    pub sources: Vec<Arc<dyn DrawSource>>,
    pub bulk: Option<Arc<dyn BulkDrawSource>>,
    pub clock: Arc<dyn LotteryClock>,
    pub acquisition_config: AcquisitionConfig,
    pub generation_config: GenerationConfig,
}

pub struct PipelineRunner {
    executions: Arc<dyn ExecutionRepository>,
    draws: Arc<dyn DrawRepository>,
    bulk: Option<Arc<dyn BulkDrawSource>>,
    clock: Arc<dyn LotteryClock>,
    poller: AcquisitionPoller,
    analytics: AnalyticsService,
    evaluation: EvaluationService,
    weighting: WeightingService,
    generation: GenerationService,
    slot: RunSlot,
}

impl PipelineRunner {
    pub fn new(deps: PipelineDependencies, slot: RunSlot) -> Self {
        let clock = deps.clock.clone();
        let poller = AcquisitionPoller::new(
            deps.sources,
            deps.draws.clone(),
            deps.clock,
            deps.acquisition_config,
        );
        let analytics = AnalyticsService::new(deps.draws.clone(), deps.analytics);
        let evaluation = EvaluationService::new(
            deps.draws.clone(),
            deps.tickets.clone(),
            deps.performance.clone(),
        );
        let weighting = WeightingService::new(deps.performance);
        let generation =
            GenerationService::new(deps.draws.clone(), deps.tickets, deps.generation_config);

        Self {
            executions: deps.executions,
            draws: deps.draws,
            bulk: deps.bulk,
            clock,
            poller,
            analytics,
            evaluation,
            weighting,
            generation,
            slot,
        }
    }

    /// Run the full pipeline once. Never panics; every exit path produces a
    /// finalized execution record and a report.
    pub async fn trigger(&self) -> PipelineReport {
        let mut exec = PipelineExecution::start();

        let _guard = match self.slot.acquire(exec.id) {
            Ok(guard) => guard,
            Err(err) => {
                warn!(error = %err, "pipeline trigger rejected");
                exec.finalize(ExecutionStatus::Failed, Some(err.to_string()));
                return report_for(&exec, PipelineOutcome::Failed, None);
            }
        };

        if let Err(err) = self.executions.create(&exec).await {
            error!(error = %err, "could not create execution record");
            exec.finalize(ExecutionStatus::Failed, Some(err.to_string()));
            return report_for(&exec, PipelineOutcome::Failed, None);
        }

        info!(execution = %exec.id, "pipeline run started");
        let result = self.run_steps(&mut exec).await;

        let report = match result {
            Ok(outcome) => {
                exec.finalize(ExecutionStatus::Completed, None);
                info!(
                    execution = %exec.id,
                    outcome = outcome.as_str(),
                    elapsed = exec.elapsed_seconds(),
                    "pipeline run completed"
                );
                report_for(&exec, outcome, None)
            }
            Err(err) => {
                let failed_step = exec.current_step.clone();
                let status = match &err {
                    DomainError::AcquisitionTimeout { .. } => ExecutionStatus::Timeout,
                    _ => ExecutionStatus::Failed,
                };
                error!(
                    execution = %exec.id,
                    step = %failed_step,
                    status = status.as_str(),
                    error = %err,
                    "pipeline run failed"
                );
                exec.finalize(status, Some(err.to_string()));
                report_for(&exec, PipelineOutcome::Failed, Some(failed_step))
            }
        };

        if let Err(err) = self.executions.update(&exec).await {
            error!(error = %err, "could not persist final execution state");
        }
        report
    }

    async fn run_steps(&self, exec: &mut PipelineExecution) -> DomainResult<PipelineOutcome> {
        // Step 1: pre-sync bulk refresh (non-critical).
        self.advance(exec, 0).await?;
        let presync_outcome = match &self.bulk {
            Some(bulk) => match self.presync(bulk.as_ref()).await {
                Ok(inserted) => StepOutcome::passed(format!("backfilled {} draws", inserted)),
                Err(err) => {
                    warn!(error = %err, "bulk pre-sync failed, continuing");
                    StepOutcome::failed_soft(err.to_string())
                }
            },
            None => StepOutcome::passed("skipped"),
        };
        exec.metadata["bulk_presync"] = json!(presync_outcome);

        // Step 2: presence check and acquisition (critical). A draw that is
        // already stored skips the sources but the run continues: analytics,
        // evaluation, weighting and generation still happen.
        self.advance(exec, 1).await?;
        let fetched = match self.poller.poll().await? {
            PollOutcome::AlreadyStored { date } => {
                exec.target_draw_date = Some(date);
                exec.metadata["acquisition"] = json!({ "outcome": "already_stored" });
                None
            }
            PollOutcome::NotReadyYet { date } => {
                exec.target_draw_date = Some(date);
                exec.metadata["acquisition"] = json!({ "outcome": "not_ready" });
                return Ok(PipelineOutcome::DrawNotReady);
            }
            PollOutcome::Fetched {
                draw,
                source,
                attempts,
            } => {
                exec.metadata["acquisition"] = json!({
                    "outcome": "fetched",
                    "source": source,
                    "attempts": attempts,
                });
                Some(draw)
            }
        };

        // Step 3: persist a newly fetched draw (no-op when it came from the
        // store).
        self.advance(exec, 2).await?;
        if let Some(draw) = &fetched {
            self.persist_draw(draw).await?;
            exec.target_draw_date = Some(draw.date);
        }

        // Step 4: analytics refresh with non-empty gate (critical).
        self.advance(exec, 3).await?;
        let analytics = self.analytics.refresh().await?;
        if analytics.pairs_stored == 0 || analytics.pattern_window == 0 {
            let reason = "analytics refresh produced no output".to_string();
            exec.metadata["analytics"] = json!(StepOutcome::failed_critical(reason.clone()));
            return Err(DomainError::GateFailed {
                step: STEP_NAMES[3].to_string(),
                reason,
            });
        }
        exec.metadata["analytics"] = json!(analytics);

        // Step 5: evaluate pending tickets (non-critical).
        self.advance(exec, 4).await?;
        match self.evaluation.run().await {
            Ok(summary) => exec.metadata["evaluation"] = json!(summary),
            Err(err) => {
                warn!(error = %err, "evaluation failed, continuing");
                exec.metadata["evaluation"] = json!(StepOutcome::failed_soft(err.to_string()));
            }
        }

        // Step 6: refresh strategy weights; the gate lives in the service.
        self.advance(exec, 5).await?;
        let weights = self.weighting.refresh().await?;

        // Step 7: generate tickets for the next scheduled drawing, never for
        // one whose result already exists (critical count gate).
        self.advance(exec, 6).await?;
        let next_draw = self.clock.next_drawing_day();
        let outcome = self.generation.generate_for(next_draw, &weights).await?;
        if outcome.persisted != outcome.expected as u64 {
            let reason = format!(
                "ticket count mismatch: persisted {} of {}",
                outcome.persisted, outcome.expected
            );
            exec.metadata["generation"] = json!(StepOutcome::failed_critical(reason.clone()));
            return Err(DomainError::GateFailed {
                step: STEP_NAMES[6].to_string(),
                reason,
            });
        }
        exec.tickets_generated = Some(outcome.persisted as u32);
        exec.target_draw_date = Some(next_draw);
        exec.advance(STEP_NAMES[6], 7);
        self.executions.update(exec).await?;

        Ok(PipelineOutcome::Generated)
    }

    /// Record entry into step `index` (0-based) and persist the transition.
    async fn advance(&self, exec: &mut PipelineExecution, index: u8) -> DomainResult<()> {
        exec.advance(STEP_NAMES[index as usize], index);
        self.executions.update(exec).await
    }

    async fn presync(&self, bulk: &dyn BulkDrawSource) -> DomainResult<u64> {
        let history = bulk.fetch_all().await?;
        let inserted = self.draws.bulk_insert(&history).await?;
        if inserted > 0 {
            info!(inserted, "pre-sync backfilled missing draws");
        }
        Ok(inserted)
    }

    async fn persist_draw(&self, draw: &Draw) -> DomainResult<()> {
        draw.validate()?;
        self.draws.insert(draw).await
    }
}

fn report_for(
    exec: &PipelineExecution,
    outcome: PipelineOutcome,
    failed_step: Option<String>,
) -> PipelineReport {
    PipelineReport {
        success: exec.status == ExecutionStatus::Completed,
        status: exec.status,
        outcome,
        execution_id: exec.id,
        elapsed_seconds: exec.elapsed_seconds(),
        tickets_generated: exec.tickets_generated,
        target_draw: exec.target_draw_date,
        failed_step,
        error: exec.error.clone(),
    }
}
