//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT, SIGTERM)
//! - Translate deliveries into shutdown triggers
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Repeat signals re-trigger the coordinator, a no-op for an in-progress
//!   shutdown; only the drain deadline bounds the drain

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Wait for the next termination request from the environment.
///
/// Resolves on SIGINT (interactive interrupt) or SIGTERM (polite terminate
/// request), whichever arrives first. Off Unix only Ctrl+C is available.
pub async fn terminated() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Spawn the watcher task mapping termination signals onto the coordinator.
///
/// Loops forever so a second signal lands on the idempotent trigger path
/// instead of the default process-killing disposition. The caller aborts
/// the task once the lifecycle has completed.
pub fn spawn_watcher(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            terminated().await;
            tracing::info!("Termination signal received");
            shutdown.trigger();
        }
    })
}
