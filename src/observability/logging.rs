//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the process-wide tracing subscriber
//! - Map the verbose flag to one of two fixed output shapes
//!
//! # Design Decisions
//! - Verbose: human-readable ANSI output at debug level
//! - Default: JSON output at info level for machine parsing
//! - RUST_LOG overrides the computed filter
//! - Initialization cannot fail; repeated calls are a no-op

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> EnvFilter {
    let directives = if verbose {
        "svc_kernel=debug,tower_http=debug,info"
    } else {
        "svc_kernel=info,tower_http=warn,info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// Initialize the logger for this process.
///
/// A pure mapping from the verbose flag to a subscriber shape; both shapes
/// timestamp every record. The result of `try_init` is discarded so a second
/// initialization (tests, embedding) is harmless.
pub fn init(verbose: bool) {
    let filter = default_filter(verbose);

    if verbose {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(true))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_noop() {
        init(true);
        init(false);
        init(true);
    }
}
