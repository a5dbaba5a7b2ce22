//! Adapters: persistence and external data sources.

pub mod sources;
pub mod sqlite;
