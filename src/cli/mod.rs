//! Command-line interface.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "drawforge", version, about = "Draw-processing and ticket generation pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration and database
    Init(commands::init::InitArgs),

    /// Trigger one pipeline run
    Run(commands::run::RunArgs),

    /// Show recent pipeline executions and aggregate stats
    Status(commands::status::StatusArgs),

    /// List stored draws
    Draws(commands::draws::DrawsArgs),

    /// List generated tickets for a draw date
    Tickets(commands::tickets::TicketsArgs),
}

/// Print an error in the requested format and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let payload = serde_json::json!({ "success": false, "error": err.to_string() });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {:#}", err);
    }
    std::process::exit(1);
}
