//! Infrastructure concerns: configuration loading.

pub mod config;

pub use config::{ConfigError, ConfigLoader};
