//! Implementation of the `drawforge status` command.

use anyhow::Result;
use clap::Args;

use crate::adapters::sqlite::SqliteExecutionRepository;
use crate::cli::output::{base_table, output, truncate, CommandOutput};
use crate::domain::models::{ExecutionStats, PipelineExecution};
use crate::domain::ports::{ExecutionFilter, ExecutionRepository};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of recent executions to show
    #[arg(long, short, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct StatusOutput {
    pub executions: Vec<PipelineExecution>,
    pub stats: ExecutionStats,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut table = base_table(&["Started", "Status", "Step", "Progress", "Tickets", "Error"]);
        for exec in &self.executions {
            table.add_row(vec![
                exec.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                exec.status.as_str().to_string(),
                exec.current_step.clone(),
                format!("{}/{}", exec.steps_completed, exec.total_steps),
                exec.tickets_generated
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                exec.error
                    .as_deref()
                    .map(|e| truncate(e, 40))
                    .unwrap_or_else(|| "-".to_string()),
            ]);
        }

        format!(
            "{}\n\nRuns: {} total, {} completed, {} failed ({:.0}% success, avg {:.1}s)",
            table,
            self.stats.total,
            self.stats.completed,
            self.stats.failed,
            self.stats.success_rate * 100.0,
            self.stats.avg_duration_seconds,
        )
    }
}

pub async fn execute(args: StatusArgs, json_mode: bool) -> Result<()> {
    let (_, pool) = super::open_database().await?;
    let repo = SqliteExecutionRepository::new(pool);

    let executions = repo
        .list(ExecutionFilter {
            limit: Some(args.limit),
            ..ExecutionFilter::default()
        })
        .await?;
    let stats = repo.stats().await?;

    output(&StatusOutput { executions, stats }, json_mode);
    Ok(())
}
