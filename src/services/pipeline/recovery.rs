//! Single-run exclusivity and crash recovery.
//!
//! The run slot guarantees at most one pipeline run per process; the startup
//! sweep and signal handler guarantee no execution row is left `running`
//! after a crash or interruption.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::ExecutionRepository;

/// Single-slot run token. `acquire` fails while another run holds the slot;
/// the returned guard releases it on drop, covering every exit path.
#[derive(Clone, Default)]
pub struct RunSlot {
    active: Arc<Mutex<Option<Uuid>>>,
}

impl RunSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, id: Uuid) -> DomainResult<RunGuard> {
        let mut active = self.active.lock().expect("run slot poisoned");
        if let Some(current) = *active {
            return Err(DomainError::PipelineBusy(current));
        }
        *active = Some(id);
        Ok(RunGuard {
            slot: self.active.clone(),
        })
    }

    /// Id of the currently active run, if any.
    pub fn active(&self) -> Option<Uuid> {
        *self.active.lock().expect("run slot poisoned")
    }
}

pub struct RunGuard {
    slot: Arc<Mutex<Option<Uuid>>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        *self.slot.lock().expect("run slot poisoned") = None;
    }
}

/// Startup sweep: any execution still `running` belongs to a dead process.
pub async fn recover_stuck_executions(
    executions: &dyn ExecutionRepository,
) -> DomainResult<u64> {
    let swept = executions
        .mark_stuck_failed("stuck in running state at startup")
        .await?;
    if swept > 0 {
        warn!(swept, "recovered executions left running by a previous process");
    }
    Ok(swept)
}

/// Install SIGINT/SIGTERM handling: mark the active run failed before exit
/// so the execution log never shows a phantom `running` row.
pub fn install_signal_handler(executions: Arc<dyn ExecutionRepository>, slot: RunSlot) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received");

        if slot.active().is_some() {
            match executions.mark_stuck_failed("interrupted by signal").await {
                Ok(n) => warn!(marked = n, "active run marked failed on shutdown"),
                Err(e) => warn!(error = %e, "failed to mark active run on shutdown"),
            }
        }
        std::process::exit(130);
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "could not install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
