//! Shared utilities for lifecycle integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;

use svc_kernel::lifecycle::{Kernel, KernelError, KernelOptions, Outcome, Shutdown};

/// A router with a liveness route and a slow route for drain scenarios.
#[allow(dead_code)]
pub fn test_router(delay: Duration) -> Router {
    Router::new()
        .route("/health", get(|| async {}))
        .route(
            "/slow",
            get(move || async move {
                tokio::time::sleep(delay).await;
                "done"
            }),
        )
}

/// Start a kernel on an ephemeral port.
///
/// Returns the bound address, a shutdown trigger, and the join handle
/// carrying the serve result.
pub async fn spawn_kernel(
    app: Router,
    options: KernelOptions,
) -> (
    SocketAddr,
    Shutdown,
    JoinHandle<Result<Outcome, KernelError>>,
) {
    let kernel = Kernel::new(options);
    let shutdown = kernel.shutdown().clone();
    let handle = kernel
        .bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = handle.local_addr();
    let server = tokio::spawn(handle.serve(app));
    (addr, shutdown, server)
}
