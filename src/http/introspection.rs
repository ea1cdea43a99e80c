//! Introspection endpoints: build metadata and liveness.
//!
//! Two fixed, side-effect-free routes merged into the assembled router
//! before serving starts. Neither depends on kernel state beyond "process
//! is up", so they keep answering on open connections while requests drain.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

/// Build metadata, fixed at compile time.
///
/// Injected into the routes at assembly time; there is no ambient global
/// carrying these values.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub branch: String,
    pub commit: String,
    pub time: String,
}

impl BuildInfo {
    /// Collect from the build environment.
    ///
    /// `BUILD_GIT_BRANCH`, `BUILD_GIT_COMMIT` and `BUILD_TIMESTAMP` are
    /// stamped by CI; absent stamps fall back to "unknown" so every field
    /// stays a non-empty string.
    pub fn from_build_env() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            branch: option_env!("BUILD_GIT_BRANCH")
                .unwrap_or("unknown")
                .to_string(),
            commit: option_env!("BUILD_GIT_COMMIT")
                .unwrap_or("unknown")
                .to_string(),
            time: option_env!("BUILD_TIMESTAMP")
                .unwrap_or("unknown")
                .to_string(),
        }
    }
}

/// Liveness probe. Success with empty body; no payload contract.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Build metadata as a structured payload, constant for the process lifetime.
async fn about(State(build): State<BuildInfo>) -> Json<BuildInfo> {
    Json(build)
}

/// The fixed auxiliary routes for one service.
///
/// `GET /health` and `GET /<service_name>/about`.
pub fn routes(service_name: &str, build: BuildInfo) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(&format!("/{}/about", service_name), get(about))
        .with_state(build)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_fields_are_non_empty() {
        let build = BuildInfo::from_build_env();
        assert!(!build.version.is_empty());
        assert!(!build.branch.is_empty());
        assert!(!build.commit.is_empty());
        assert!(!build.time.is_empty());
    }

    #[tokio::test]
    async fn about_returns_injected_metadata() {
        let build = BuildInfo {
            version: "1.2.3".to_string(),
            branch: "main".to_string(),
            commit: "abc123".to_string(),
            time: "2026-01-01T00:00:00Z".to_string(),
        };

        let Json(payload) = about(State(build.clone())).await;
        assert_eq!(payload.version, build.version);
        assert_eq!(payload.commit, build.commit);
    }

    #[tokio::test]
    async fn health_is_plain_200() {
        assert_eq!(health().await, StatusCode::OK);
    }
}
