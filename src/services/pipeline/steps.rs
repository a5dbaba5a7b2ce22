//! Step outcome and gate plumbing for the pipeline orchestrator.

use serde::Serialize;

/// Ordered pipeline step names; also the values stored in
/// `pipeline_executions.current_step`.
pub const STEP_NAMES: [&str; 7] = [
    "bulk_presync",
    "acquisition",
    "persist_draw",
    "analytics_refresh",
    "evaluation",
    "weighting",
    "generation",
];

/// Outcome of one pipeline step.
///
/// A failed critical step aborts the run; a failed non-critical step is
/// recorded and the run continues.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub ok: bool,
    pub critical: bool,
    pub detail: String,
}

impl StepOutcome {
    pub fn passed(detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            critical: false,
            detail: detail.into(),
        }
    }

    pub fn failed_critical(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            critical: true,
            detail: detail.into(),
        }
    }

    pub fn failed_soft(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            critical: false,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        assert!(StepOutcome::passed("ok").ok);
        let hard = StepOutcome::failed_critical("no");
        assert!(!hard.ok && hard.critical);
        let soft = StepOutcome::failed_soft("meh");
        assert!(!soft.ok && !soft.critical);
    }
}
