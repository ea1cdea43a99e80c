//! Reference service binary.
//!
//! Wires the full control flow the crate exists for: configuration loader
//! → logger factory → router assembly → lifecycle kernel, which owns the
//! process exit code. A real service mounts its business routes in
//! [`assemble_router`]; everything else stays as-is.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use axum::Router;
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use svc_kernel::config::{self, ConfigError};
use svc_kernel::http::{introspection, middleware, recover};
use svc_kernel::lifecycle::{self, KernelOptions};
use svc_kernel::observability::logging;

#[derive(Parser)]
#[command(name = "svc-kernel")]
#[command(about = "Reference service wired through the lifecycle kernel", long_about = None)]
struct Cli {
    /// Path to the optional TOML override file (skipped when absent).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging (human-readable, debug level).
    #[arg(short, long)]
    verbose: bool,
}

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration comes first; without it there is no logger config
    // either, so loader failures go to stderr, one line per failing field.
    let result = match &cli.config {
        Some(path) => {
            let vars: HashMap<String, String> = std::env::vars().collect();
            config::load_from(Some(path), &vars)
        }
        None => config::load(),
    };

    let config = match result {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("configuration invalid:");
            for error in &errors {
                eprintln!("  {}", error);
            }
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init(config.verbose || cli.verbose);

    tracing::info!(
        service = %config.service_name,
        bind_address = %config.bind_address,
        shutdown_grace_secs = config.shutdown_grace_secs,
        features = ?config.features,
        "Configuration loaded"
    );

    let build = introspection::BuildInfo::from_build_env();
    let app = assemble_router(&config.service_name, build);

    let options = KernelOptions {
        drain_timeout: config.drain_timeout(),
    };

    match lifecycle::run(&config.bind_address, app, options).await {
        Ok(outcome) => {
            tracing::info!(outcome = ?outcome, "Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Lifecycle failed");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Assemble the service router: introspection routes plus the standard
/// middleware stack. Business routes from the service assembler mount here.
fn assemble_router(service_name: &str, build: introspection::BuildInfo) -> Router {
    Router::new()
        .merge(introspection::routes(service_name, build))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::set_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(middleware::propagate_request_id_layer())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(recover::layer())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
}
