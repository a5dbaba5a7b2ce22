//! Implementation of the `drawforge draws` command.

use anyhow::Result;
use clap::Args;

use crate::adapters::sqlite::{SqliteAnalyticsRepository, SqliteDrawRepository};
use crate::cli::output::{base_table, output, CommandOutput};
use crate::domain::models::Draw;
use crate::domain::ports::{AnalyticsRepository, DrawRepository, PairCount};

const TOP_PAIRS_SHOWN: i64 = 5;

#[derive(Args, Debug)]
pub struct DrawsArgs {
    /// Number of most recent draws to show
    #[arg(long, short, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, serde::Serialize)]
pub struct DrawsOutput {
    pub draws: Vec<Draw>,
    pub total_stored: u64,
    /// Most frequent white-ball pairs from the last analytics refresh.
    pub top_pairs: Vec<PairCount>,
}

impl CommandOutput for DrawsOutput {
    fn to_human(&self) -> String {
        let mut table = base_table(&["Date", "White Balls", "Special"]);
        // Newest first for reading.
        for draw in self.draws.iter().rev() {
            let whites = draw
                .white
                .iter()
                .map(|n| format!("{:02}", n))
                .collect::<Vec<_>>()
                .join(" ");
            table.add_row(vec![
                draw.date.to_string(),
                whites,
                format!("{:02}", draw.special),
            ]);
        }
        let mut out = format!("{}\n\n{} draws stored", table, self.total_stored);
        if !self.top_pairs.is_empty() {
            let pairs = self
                .top_pairs
                .iter()
                .map(|p| format!("{:02}+{:02} (x{})", p.a, p.b, p.count))
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("\nHot pairs: {}", pairs));
        }
        out
    }
}

pub async fn execute(args: DrawsArgs, json_mode: bool) -> Result<()> {
    let (_, pool) = super::open_database().await?;
    let repo = SqliteDrawRepository::new(pool.clone());
    let analytics = SqliteAnalyticsRepository::new(pool);

    let draws = repo.recent(args.limit).await?;
    let total_stored = repo.count().await?;
    let top_pairs = analytics.top_pairs(TOP_PAIRS_SHOWN).await?;

    output(
        &DrawsOutput {
            draws,
            total_stored,
            top_pairs,
        },
        json_mode,
    );
    Ok(())
}
