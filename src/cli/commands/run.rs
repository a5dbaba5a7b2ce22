//! Implementation of the `drawforge run` command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::adapters::sources::{BulkFileSource, ResultsApiSource, WebScrapeSource};
use crate::adapters::sqlite::{
    SqliteAnalyticsRepository, SqliteDrawRepository, SqliteExecutionRepository,
    SqlitePerformanceRepository, SqliteTicketRepository,
};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, PipelineReport};
use crate::domain::ports::{DrawSource, SystemClock};
use crate::services::pipeline::{
    install_signal_handler, recover_stuck_executions, PipelineDependencies, PipelineRunner,
    RunSlot,
};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip the bulk history pre-sync step
    #[arg(long)]
    pub no_presync: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct RunOutput(PipelineReport);

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        let mut lines = vec![
            format!("Execution:  {}", report.execution_id),
            format!("Status:     {}", report.status.as_str()),
            format!("Outcome:    {}", report.outcome.as_str()),
            format!("Elapsed:    {:.1}s", report.elapsed_seconds),
        ];
        if let Some(date) = report.target_draw {
            lines.push(format!("Target:     {}", date));
        }
        if let Some(count) = report.tickets_generated {
            lines.push(format!("Tickets:    {}", count));
        }
        if let Some(step) = &report.failed_step {
            lines.push(format!("Failed at:  {}", step));
        }
        if let Some(error) = &report.error {
            lines.push(format!("Error:      {}", error));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: RunArgs, json_mode: bool) -> Result<()> {
    let (config, pool) = super::open_database().await?;

    let executions = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    recover_stuck_executions(executions.as_ref()).await?;

    let slot = RunSlot::new();
    install_signal_handler(executions.clone(), slot.clone());

    let runner = PipelineRunner::new(build_dependencies(&config, &pool, executions, !args.no_presync), slot);
    let report = runner.trigger().await;
    let success = report.success;

    output(&RunOutput(report), json_mode);
    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn build_dependencies(
    config: &Config,
    pool: &sqlx::SqlitePool,
    executions: Arc<SqliteExecutionRepository>,
    presync: bool,
) -> PipelineDependencies {
    let acquisition = config.acquisition.clone();
    let timeout = Duration::from_secs(acquisition.attempt_timeout_secs);

    let mut sources: Vec<Arc<dyn DrawSource>> = vec![Arc::new(WebScrapeSource::new(
        acquisition.results_page_url.clone(),
        timeout,
    ))];
    if let Some(api_key) = &acquisition.api_key {
        sources.push(Arc::new(ResultsApiSource::new(
            acquisition.results_api_url.clone(),
            api_key.clone(),
            timeout,
        )));
    }
    let bulk = Arc::new(BulkFileSource::new(acquisition.bulk_file_url.clone(), timeout));
    sources.push(bulk.clone());

    PipelineDependencies {
        executions,
        draws: Arc::new(SqliteDrawRepository::new(pool.clone())),
        tickets: Arc::new(SqliteTicketRepository::new(pool.clone())),
        performance: Arc::new(SqlitePerformanceRepository::new(pool.clone())),
        analytics: Arc::new(SqliteAnalyticsRepository::new(pool.clone())),
        sources,
        bulk: if presync { Some(bulk) } else { None },
        clock: Arc::new(SystemClock),
        acquisition_config: acquisition,
        generation_config: config.generation.clone(),
    }
}
