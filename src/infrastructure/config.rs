//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid tickets_per_run: {0}. Must be at least 1")]
    InvalidTicketsPerRun(u32),

    #[error("Invalid batch_size: {0}. Must be between 1 and tickets_per_run")]
    InvalidBatchSize(u32),

    #[error("Momentum windows invalid: short ({0}) must be less than long ({1})")]
    InvalidMomentumWindows(usize, usize),

    #[error("Acquisition budget ({0}s) must cover at least one attempt ({1}s)")]
    InvalidAcquisitionBudget(u64, u64),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. .drawforge/config.yaml (project config, created by init)
    /// 3. .drawforge/local.yaml (optional local overrides)
    /// 4. Environment variables (DRAWFORGE_* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".drawforge/config.yaml"))
            .merge(Yaml::file(".drawforge/local.yaml"))
            .merge(Env::prefixed("DRAWFORGE_").split("__"))
            .extract()
            .context("Failed to extract configuration")?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !["json", "pretty"].contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let gen = &config.generation;
        if gen.tickets_per_run == 0 {
            return Err(ConfigError::InvalidTicketsPerRun(gen.tickets_per_run));
        }
        if gen.batch_size == 0 || gen.batch_size > gen.tickets_per_run {
            return Err(ConfigError::InvalidBatchSize(gen.batch_size));
        }
        if gen.short_window >= gen.long_window {
            return Err(ConfigError::InvalidMomentumWindows(
                gen.short_window,
                gen.long_window,
            ));
        }

        let acq = &config.acquisition;
        if acq.total_budget_secs < acq.attempt_timeout_secs {
            return Err(ConfigError::InvalidAcquisitionBudget(
                acq.total_budget_secs,
                acq.attempt_timeout_secs,
            ));
        }

        Ok(())
    }
}
