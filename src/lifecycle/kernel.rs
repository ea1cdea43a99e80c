//! Listener lifecycle state machine.
//!
//! # Responsibilities
//! - Bind the listen address and start the accept loop
//! - Race serving against the shutdown coordinator
//! - Drive the ordered stop sequence: stop accepting, drain, release
//!
//! # Design Decisions
//! - Bind failure is fatal with no shutdown sequence (nothing started)
//! - A serving error schedules shutdown exactly like a signal does
//! - Drain is bounded by the deadline only; repeat triggers are no-ops
//! - Move semantics: one `ServerHandle` per kernel, destroyed exactly once

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;

/// Observable lifecycle states, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelState {
    Idle,
    Serving,
    ShuttingDown,
    Stopped,
    Failed,
}

/// How a completed lifecycle ended. Both variants map to exit code 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every in-flight request drained within the deadline.
    Clean,
    /// The drain deadline elapsed; remaining connections were closed
    /// forcibly. Degraded and logged as a warning, but not a failure.
    DrainTimedOut,
}

/// Fatal lifecycle errors. Both variants map to a non-zero exit code.
#[derive(Debug, Error)]
pub enum KernelError {
    /// The listen address could not be parsed or bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The serving task failed while being stopped.
    #[error("failed to stop listener: {0}")]
    Shutdown(String),
}

impl KernelError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Tunables for one kernel instance.
#[derive(Debug, Clone)]
pub struct KernelOptions {
    /// Upper bound on the drain wait. `None` waits for in-flight requests
    /// indefinitely.
    pub drain_timeout: Option<Duration>,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            drain_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Owner of one listener's start/stop lifecycle.
///
/// [`Kernel::bind`] consumes the kernel and yields a [`ServerHandle`];
/// [`ServerHandle::serve`] consumes the handle and blocks until shutdown
/// has finished. Shutdown receivers are created here, at construction, so
/// a trigger delivered any time after `new` is never lost.
pub struct Kernel {
    options: KernelOptions,
    shutdown: Shutdown,
    trigger_rx: broadcast::Receiver<()>,
    drain_rx: broadcast::Receiver<()>,
    state_tx: watch::Sender<KernelState>,
}

impl Kernel {
    pub fn new(options: KernelOptions) -> Self {
        let shutdown = Shutdown::new();
        let trigger_rx = shutdown.subscribe();
        let drain_rx = shutdown.subscribe();
        let (state_tx, _) = watch::channel(KernelState::Idle);

        Self {
            options,
            shutdown,
            trigger_rx,
            drain_rx,
            state_tx,
        }
    }

    /// The shutdown coordinator. Clones of it trigger shutdown from signal
    /// watchers, tests, or embedding code.
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Subscribe to state transitions.
    pub fn state(&self) -> watch::Receiver<KernelState> {
        self.state_tx.subscribe()
    }

    /// Bind the listen address.
    ///
    /// On failure the kernel ends in `Failed` and no shutdown sequence
    /// runs; nothing was started.
    pub async fn bind(self, addr: &str) -> Result<ServerHandle, KernelError> {
        let Kernel {
            options,
            shutdown,
            trigger_rx,
            drain_rx,
            state_tx,
        } = self;

        let bind_err = |addr: &str, source: std::io::Error| {
            tracing::error!(address = %addr, error = %source, "Failed to bind listener");
            KernelError::Bind {
                addr: addr.to_string(),
                source,
            }
        };

        let parsed: SocketAddr = match addr.parse() {
            Ok(a) => a,
            Err(e) => {
                state_tx.send_replace(KernelState::Failed);
                return Err(bind_err(
                    addr,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
                ));
            }
        };

        let listener = match TcpListener::bind(parsed).await {
            Ok(l) => l,
            Err(e) => {
                state_tx.send_replace(KernelState::Failed);
                return Err(bind_err(addr, e));
            }
        };

        let local_addr = match listener.local_addr() {
            Ok(a) => a,
            Err(e) => {
                state_tx.send_replace(KernelState::Failed);
                return Err(bind_err(addr, e));
            }
        };

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(ServerHandle {
            listener,
            local_addr,
            options,
            shutdown,
            trigger_rx,
            drain_rx,
            state_tx,
        })
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new(KernelOptions::default())
    }
}

/// The bound listener plus its request-serving loop.
#[derive(Debug)]
pub struct ServerHandle {
    listener: TcpListener,
    local_addr: SocketAddr,
    options: KernelOptions,
    shutdown: Shutdown,
    trigger_rx: broadcast::Receiver<()>,
    drain_rx: broadcast::Receiver<()>,
    state_tx: watch::Sender<KernelState>,
}

impl ServerHandle {
    /// The address actually bound; differs from the requested one when the
    /// port was `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve requests until shutdown completes.
    ///
    /// The accept loop and the shutdown watcher run as independent tasks
    /// underneath; this call blocks until the stop sequence has finished,
    /// so the caller observes a single synchronous lifecycle.
    pub async fn serve(self, app: Router) -> Result<Outcome, KernelError> {
        let ServerHandle {
            listener,
            local_addr,
            options,
            shutdown,
            mut trigger_rx,
            mut drain_rx,
            state_tx,
        } = self;

        // Resolving this future makes hyper stop accepting immediately and
        // let already-accepted connections finish their current cycle.
        let graceful = async move {
            let _ = drain_rx.recv().await;
        };

        let mut server = tokio::spawn(
            axum::serve(listener, app)
                .with_graceful_shutdown(graceful)
                .into_future(),
        );

        state_tx.send_replace(KernelState::Serving);
        tracing::info!(address = %local_addr, "Serving");

        tokio::select! {
            _ = trigger_rx.recv() => {
                state_tx.send_replace(KernelState::ShuttingDown);
                tracing::info!("Shutdown requested, draining in-flight requests");

                let result = drain(&mut server, options.drain_timeout).await;
                state_tx.send_replace(match result {
                    Ok(_) => KernelState::Stopped,
                    Err(_) => KernelState::Failed,
                });
                result
            }
            joined = &mut server => {
                // Serving ended on its own: an unrecoverable serving error
                // (or the listener closing underneath us). Same transition
                // as a signal; there is nothing left to drain.
                state_tx.send_replace(KernelState::ShuttingDown);
                shutdown.trigger();

                match joined {
                    Ok(Ok(())) => {
                        state_tx.send_replace(KernelState::Stopped);
                        tracing::info!("Listener stopped");
                        Ok(Outcome::Clean)
                    }
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, "Serving failed, shutting down");
                        state_tx.send_replace(KernelState::Stopped);
                        Ok(Outcome::Clean)
                    }
                    Err(join_err) => {
                        tracing::error!(error = %join_err, "Serving task failed");
                        state_tx.send_replace(KernelState::Failed);
                        Err(KernelError::Shutdown(join_err.to_string()))
                    }
                }
            }
        }
    }
}

/// Wait for the serving task to finish draining, bounded by the deadline.
async fn drain(
    server: &mut JoinHandle<std::io::Result<()>>,
    deadline: Option<Duration>,
) -> Result<Outcome, KernelError> {
    let joined = match deadline {
        Some(limit) => match tokio::time::timeout(limit, &mut *server).await {
            Ok(joined) => joined,
            Err(_) => {
                server.abort();
                let _ = (&mut *server).await;
                tracing::warn!(
                    deadline_secs = limit.as_secs_f64(),
                    "Drain deadline elapsed, forcibly closed remaining connections"
                );
                return Ok(Outcome::DrainTimedOut);
            }
        },
        None => (&mut *server).await,
    };

    match joined {
        Ok(Ok(())) => {
            tracing::info!("Listener stopped cleanly");
            Ok(Outcome::Clean)
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Listener failed while stopping");
            Err(KernelError::Shutdown(e.to_string()))
        }
        Err(join_err) => {
            tracing::error!(error = %join_err, "Serving task failed while stopping");
            Err(KernelError::Shutdown(join_err.to_string()))
        }
    }
}

/// Bind, watch for OS termination signals, and serve.
///
/// The composed lifecycle the reference binary calls: returns once shutdown
/// has finished, with the value the process exit code derives from.
pub async fn run(addr: &str, app: Router, options: KernelOptions) -> Result<Outcome, KernelError> {
    let kernel = Kernel::new(options);
    let watcher = signals::spawn_watcher(kernel.shutdown().clone());

    let handle = match kernel.bind(addr).await {
        Ok(handle) => handle,
        Err(e) => {
            watcher.abort();
            return Err(e);
        }
    };

    let result = handle.serve(app).await;
    watcher.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn test_app() -> Router {
        Router::new().route("/", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn bind_reports_actual_address() {
        let kernel = Kernel::default();
        let handle = kernel.bind("127.0.0.1:0").await.unwrap();
        assert_ne!(handle.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn unparseable_address_fails_without_serving() {
        let kernel = Kernel::default();
        let state = kernel.state();
        let err = kernel.bind("not-an-address").await.unwrap_err();

        assert!(matches!(err, KernelError::Bind { .. }));
        assert_ne!(err.exit_code(), 0);
        assert_eq!(*state.borrow(), KernelState::Failed);
    }

    #[tokio::test]
    async fn trigger_before_serve_still_shuts_down() {
        let kernel = Kernel::default();
        let shutdown = kernel.shutdown().clone();
        let handle = kernel.bind("127.0.0.1:0").await.unwrap();

        // Receivers were created in Kernel::new, so an early trigger is
        // retained rather than lost.
        shutdown.trigger();

        let outcome = handle.serve(test_app()).await.unwrap();
        assert_eq!(outcome, Outcome::Clean);
    }

    #[tokio::test]
    async fn states_transition_in_order() {
        let kernel = Kernel::default();
        let shutdown = kernel.shutdown().clone();
        let mut state = kernel.state();
        assert_eq!(*state.borrow(), KernelState::Idle);

        let handle = kernel.bind("127.0.0.1:0").await.unwrap();
        let server = tokio::spawn(handle.serve(test_app()));

        state
            .wait_for(|s| *s == KernelState::Serving)
            .await
            .unwrap();
        shutdown.trigger();
        state
            .wait_for(|s| *s == KernelState::Stopped)
            .await
            .unwrap();

        assert_eq!(server.await.unwrap().unwrap(), Outcome::Clean);
    }
}
