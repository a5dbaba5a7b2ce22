use serde::{Deserialize, Serialize};

/// Main configuration structure for drawforge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Data acquisition configuration
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Ticket generation tuning
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            acquisition: AcquisitionConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".drawforge/drawforge.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Data acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AcquisitionConfig {
    /// URL of the official results page (primary source)
    #[serde(default = "default_results_page_url")]
    pub results_page_url: String,

    /// URL of the secondary results API
    #[serde(default = "default_results_api_url")]
    pub results_api_url: String,

    /// API key for the secondary source; the source is skipped when absent
    #[serde(default)]
    pub api_key: Option<String>,

    /// URL of the tertiary bulk results file
    #[serde(default = "default_bulk_file_url")]
    pub bulk_file_url: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Hard total wall-clock budget for one polling cycle, in seconds
    #[serde(default = "default_total_budget_secs")]
    pub total_budget_secs: u64,

    /// Attempts per source before falling through to the next tier
    #[serde(default = "default_attempts_per_source")]
    pub attempts_per_source: u32,
}

fn default_results_page_url() -> String {
    "https://www.powerball.com/".to_string()
}

fn default_results_api_url() -> String {
    "https://data.ny.gov/resource/d6yy-54nr.json".to_string()
}

fn default_bulk_file_url() -> String {
    "https://data.ny.gov/api/views/d6yy-54nr/rows.csv".to_string()
}

const fn default_attempt_timeout_secs() -> u64 {
    15
}

const fn default_total_budget_secs() -> u64 {
    120
}

const fn default_attempts_per_source() -> u32 {
    2
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            results_page_url: default_results_page_url(),
            results_api_url: default_results_api_url(),
            api_key: None,
            bulk_file_url: default_bulk_file_url(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            total_budget_secs: default_total_budget_secs(),
            attempts_per_source: default_attempts_per_source(),
        }
    }
}

/// Ticket generation tuning constants.
///
/// The conformity thresholds and retry caps are empirical; they are carried
/// as configuration rather than derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Total tickets generated per run
    #[serde(default = "default_tickets_per_run")]
    pub tickets_per_run: u32,

    /// Tickets persisted per batch (memory bound)
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Exponential decay factor for temporal weighting
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f64,

    /// Short momentum window in draws
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    /// Long momentum window in draws
    #[serde(default = "default_long_window")]
    pub long_window: usize,

    /// Minimum conformity for the pattern strategy to accept a candidate
    #[serde(default = "default_pattern_conformity_min")]
    pub pattern_conformity_min: f64,

    /// Rejection-sampling cap for the pattern strategy
    #[serde(default = "default_pattern_max_attempts")]
    pub pattern_max_attempts: u32,

    /// Minimum conformity for the hybrid strategy to accept a candidate
    #[serde(default = "default_hybrid_conformity_min")]
    pub hybrid_conformity_min: f64,

    /// Retry cap for the hybrid strategy
    #[serde(default = "default_hybrid_max_attempts")]
    pub hybrid_max_attempts: u32,
}

const fn default_tickets_per_run() -> u32 {
    200
}

const fn default_batch_size() -> u32 {
    40
}

const fn default_decay_factor() -> f64 {
    0.05
}

const fn default_short_window() -> usize {
    10
}

const fn default_long_window() -> usize {
    50
}

const fn default_pattern_conformity_min() -> f64 {
    0.5
}

const fn default_pattern_max_attempts() -> u32 {
    100
}

const fn default_hybrid_conformity_min() -> f64 {
    0.4
}

const fn default_hybrid_max_attempts() -> u32 {
    50
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tickets_per_run: default_tickets_per_run(),
            batch_size: default_batch_size(),
            decay_factor: default_decay_factor(),
            short_window: default_short_window(),
            long_window: default_long_window(),
            pattern_conformity_min: default_pattern_conformity_min(),
            pattern_max_attempts: default_pattern_max_attempts(),
            hybrid_conformity_min: default_hybrid_conformity_min(),
            hybrid_max_attempts: default_hybrid_max_attempts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generation.tickets_per_run, 200);
        assert_eq!(config.generation.batch_size, 40);
        assert_eq!(config.generation.decay_factor, 0.05);
        assert!(config.acquisition.api_key.is_none());
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.generation.tickets_per_run, config.generation.tickets_per_run);
        assert_eq!(back.database.path, config.database.path);
    }
}
