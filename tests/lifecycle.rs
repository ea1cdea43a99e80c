//! Lifecycle integration tests: bind, serve, drain, exit outcomes.

mod common;

use std::time::{Duration, Instant};

use common::{spawn_kernel, test_router};
use svc_kernel::lifecycle::{Kernel, KernelError, KernelOptions, Outcome};

fn options(drain: Option<Duration>) -> KernelOptions {
    KernelOptions {
        drain_timeout: drain,
    }
}

#[tokio::test]
async fn clean_shutdown_on_trigger() {
    let (addr, shutdown, server) = spawn_kernel(
        test_router(Duration::from_millis(10)),
        KernelOptions::default(),
    )
    .await;

    let response = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    shutdown.trigger();
    assert_eq!(server.await.unwrap().unwrap(), Outcome::Clean);
}

#[tokio::test]
async fn second_trigger_during_drain_is_ignored() {
    let (addr, shutdown, server) = spawn_kernel(
        test_router(Duration::from_millis(400)),
        options(Some(Duration::from_secs(5))),
    )
    .await;

    let url = format!("http://{}/slow", addr);
    let request = tokio::spawn(async move { reqwest::get(url).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(50)).await;
    // Already shutting down: this must neither abort the drain nor shorten
    // the deadline.
    shutdown.trigger();

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(server.await.unwrap().unwrap(), Outcome::Clean);
}

#[tokio::test]
async fn bind_conflict_is_fatal_and_accepts_nothing() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = occupied.local_addr().unwrap();

    let kernel = Kernel::default();
    let err = kernel.bind(&addr.to_string()).await.unwrap_err();
    assert!(matches!(err, KernelError::Bind { .. }));
    assert_ne!(err.exit_code(), 0);

    // The holder of the port never sees a connection from the failed kernel.
    let accepted = tokio::time::timeout(Duration::from_millis(100), occupied.accept()).await;
    assert!(accepted.is_err());
}

#[tokio::test]
async fn inflight_request_completes_before_stop() {
    // A request is mid-flight when the termination notification arrives;
    // it must finish its full cycle and the process must stop cleanly
    // well inside the drain deadline.
    let (addr, shutdown, server) = spawn_kernel(
        test_router(Duration::from_millis(500)),
        options(Some(Duration::from_secs(10))),
    )
    .await;

    let url = format!("http://{}/slow", addr);
    let started = Instant::now();
    let request = tokio::spawn(async move { reqwest::get(url).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "done");

    assert_eq!(server.await.unwrap().unwrap(), Outcome::Clean);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn drain_deadline_forces_close_but_is_not_fatal() {
    let (addr, shutdown, server) = spawn_kernel(
        test_router(Duration::from_secs(30)),
        options(Some(Duration::from_millis(200))),
    )
    .await;

    let url = format!("http://{}/slow", addr);
    let request = tokio::spawn(async move { reqwest::get(url).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();

    // The straggler outlives the deadline: forced close, warning, exit 0.
    assert_eq!(server.await.unwrap().unwrap(), Outcome::DrainTimedOut);

    let result = request.await.unwrap();
    assert!(match result {
        Err(_) => true,
        Ok(response) => !response.status().is_success(),
    });
}

#[tokio::test]
async fn unbounded_drain_waits_for_stragglers() {
    let (addr, shutdown, server) = spawn_kernel(test_router(Duration::from_millis(600)), options(None)).await;

    let url = format!("http://{}/slow", addr);
    let request = tokio::spawn(async move { reqwest::get(url).await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.trigger();

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(server.await.unwrap().unwrap(), Outcome::Clean);
}

#[tokio::test]
async fn health_answers_while_another_request_is_in_flight() {
    let (addr, _shutdown, server) = spawn_kernel(
        test_router(Duration::from_millis(500)),
        KernelOptions::default(),
    )
    .await;

    let slow_url = format!("http://{}/slow", addr);
    let slow = tokio::spawn(async move { reqwest::get(slow_url).await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Liveness keeps answering while the slow request occupies the handler.
    let response = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    assert_eq!(slow.await.unwrap().unwrap().status(), 200);
    server.abort();
}
