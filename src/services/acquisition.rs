//! Draw acquisition: tiered polling of external sources for the latest
//! official result.
//!
//! Sources are tried in order of preference with per-attempt timeouts and a
//! hard total budget. A source result only counts when it carries the
//! drawing date we are waiting for and validates structurally.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AcquisitionConfig, Draw};
use crate::domain::ports::{DrawRepository, DrawSource, LotteryClock};

/// Result of one poll for the latest scheduled drawing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// The draw was already stored; nothing fetched.
    AlreadyStored { date: NaiveDate },
    /// The drawing time has not passed yet; polling would be pointless.
    NotReadyYet { date: NaiveDate },
    /// A new draw was fetched and validated.
    Fetched {
        draw: Draw,
        source: &'static str,
        attempts: Vec<AttemptRecord>,
    },
}

/// Diagnostic record of one source attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub source: &'static str,
    pub outcome: String,
    pub elapsed_ms: u64,
}

pub struct AcquisitionPoller {
    sources: Vec<Arc<dyn DrawSource>>,
    draws: Arc<dyn DrawRepository>,
    clock: Arc<dyn LotteryClock>,
    config: AcquisitionConfig,
}

impl AcquisitionPoller {
    pub fn new(
        sources: Vec<Arc<dyn DrawSource>>,
        draws: Arc<dyn DrawRepository>,
        clock: Arc<dyn LotteryClock>,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            sources,
            draws,
            clock,
            config,
        }
    }

    /// Poll for the most recent scheduled drawing's result.
    pub async fn poll(&self) -> DomainResult<PollOutcome> {
        let target = self.clock.latest_drawing_day();

        if self.draws.get(target).await?.is_some() {
            debug!(date = %target, "draw already stored, skipping acquisition");
            return Ok(PollOutcome::AlreadyStored { date: target });
        }
        if !self.clock.drawing_has_occurred(target) {
            return Ok(PollOutcome::NotReadyYet { date: target });
        }

        self.fetch(target).await
    }

    /// Walk the source tiers until one yields a valid draw for `target`.
    async fn fetch(&self, target: NaiveDate) -> DomainResult<PollOutcome> {
        let started = Instant::now();
        let budget = Duration::from_secs(self.config.total_budget_secs);
        let attempt_timeout = Duration::from_secs(self.config.attempt_timeout_secs);
        let mut attempts = Vec::new();

        for source in &self.sources {
            for round in 0..self.config.attempts_per_source {
                if started.elapsed() >= budget {
                    warn!(date = %target, elapsed_ms = started.elapsed().as_millis() as u64,
                        "acquisition budget exhausted");
                    return Err(DomainError::AcquisitionTimeout {
                        attempts: attempts.len() as u32,
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                }

                let attempt_start = Instant::now();
                let result =
                    tokio::time::timeout(attempt_timeout, source.fetch_latest()).await;
                let elapsed_ms = attempt_start.elapsed().as_millis() as u64;

                let outcome = match result {
                    Ok(Ok(draw)) if draw.date == target => {
                        draw.validate()?;
                        info!(source = source.name(), date = %target, elapsed_ms,
                            "draw acquired");
                        attempts.push(AttemptRecord {
                            source: source.name(),
                            outcome: "fetched".to_string(),
                            elapsed_ms,
                        });
                        return Ok(PollOutcome::Fetched {
                            draw,
                            source: source.name(),
                            attempts,
                        });
                    }
                    Ok(Ok(draw)) => format!("stale result for {}", draw.date),
                    Ok(Err(e)) => e.to_string(),
                    Err(_) => format!("timed out after {}s", attempt_timeout.as_secs()),
                };
                debug!(source = source.name(), round, elapsed_ms, outcome = %outcome,
                    "acquisition attempt failed");
                attempts.push(AttemptRecord {
                    source: source.name(),
                    outcome,
                    elapsed_ms,
                });
            }
        }

        let last_reason = attempts
            .last()
            .map(|a| a.outcome.clone())
            .unwrap_or_else(|| "no sources configured".to_string());
        Err(DomainError::AcquisitionFailed {
            origin: attempts.last().map(|a| a.source).unwrap_or("none").to_string(),
            reason: last_reason,
        })
    }
}
