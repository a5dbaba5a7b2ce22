//! drawforge: lottery draw processing and adaptive ticket generation.
//!
//! Layered crate: `domain` holds models, ports, and errors; `adapters`
//! implements persistence and external data sources; `services` carries the
//! statistical core and the pipeline orchestrator; `cli` is the outer
//! surface.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;
