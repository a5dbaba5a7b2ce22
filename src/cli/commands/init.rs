//! Implementation of the `drawforge init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("Wrote .drawforge/config.yaml".to_string());
        }
        if self.database_initialized {
            lines.push("Database initialized at .drawforge/drawforge.db".to_string());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let project_dir = target_path.join(".drawforge");
    if project_dir.exists() && !args.force {
        output(
            &InitOutput {
                success: false,
                message: "Project already initialized. Use --force to reinitialize.".to_string(),
                initialized_path: target_path,
                config_written: false,
                database_initialized: false,
            },
            json_mode,
        );
        return Ok(());
    }

    if args.force && project_dir.exists() {
        fs::remove_dir_all(&project_dir)
            .await
            .context("Failed to remove existing .drawforge directory")?;
    }

    fs::create_dir_all(&project_dir)
        .await
        .with_context(|| format!("Failed to create {:?}", project_dir))?;

    let config = Config::default();
    let config_yaml =
        render_config_file(&config).context("Failed to serialize default configuration")?;
    fs::write(project_dir.join("config.yaml"), config_yaml)
        .await
        .context("Failed to write config.yaml")?;

    let db_path = project_dir.join("drawforge.db");
    let pool = create_pool(&db_path.to_string_lossy(), config.database.max_connections)
        .await
        .context("Failed to create database")?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to run migrations")?;
    pool.close().await;

    output(
        &InitOutput {
            success: true,
            message: format!("Initialized drawforge project at {}", target_path.display()),
            initialized_path: target_path,
            config_written: true,
            database_initialized: true,
        },
        json_mode,
    );
    Ok(())
}

/// Render the default config file contents. YAML is a superset of JSON, so
/// the pretty JSON rendering is a valid config.yaml.
fn render_config_file(config: &Config) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
