//! drawforge CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drawforge::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init(args) => drawforge::cli::commands::init::execute(args, cli.json).await,
        Commands::Run(args) => drawforge::cli::commands::run::execute(args, cli.json).await,
        Commands::Status(args) => drawforge::cli::commands::status::execute(args, cli.json).await,
        Commands::Draws(args) => drawforge::cli::commands::draws::execute(args, cli.json).await,
        Commands::Tickets(args) => drawforge::cli::commands::tickets::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        drawforge::cli::handle_error(err, cli.json);
    }
}
