//! Configuration schema definitions.
//!
//! This module defines the runtime configuration of a service process.
//! All types derive Serde traits for deserialization from the optional
//! override file; environment variables are applied on top by the loader.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for a service process.
///
/// Assembled once at startup, validated, and treated as immutable for the
/// rest of the process lifetime. The lifecycle kernel never re-validates it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Service name; prefixes the about route ("/<service_name>/about").
    pub service_name: String,

    /// Listen address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Verbose logging: human-readable output at debug level.
    /// Off means JSON output at info level.
    pub verbose: bool,

    /// Database DSN handed to the service assembler. Opaque to the kernel.
    pub database_url: String,

    /// Feature flags handed to the service assembler.
    pub features: Vec<String>,

    /// Drain deadline for graceful shutdown, in seconds. Zero means
    /// unbounded: wait for in-flight requests however long they take.
    pub shutdown_grace_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service_name: "gateway".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            verbose: false,
            database_url: String::new(),
            features: Vec::new(),
            shutdown_grace_secs: 30,
        }
    }
}

impl RuntimeConfig {
    /// The drain deadline as a `Duration`, `None` when unbounded.
    pub fn drain_timeout(&self) -> Option<Duration> {
        if self.shutdown_grace_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.shutdown_grace_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_grace_means_unbounded_drain() {
        let mut config = RuntimeConfig::default();
        assert_eq!(config.drain_timeout(), Some(Duration::from_secs(30)));

        config.shutdown_grace_secs = 0;
        assert_eq!(config.drain_timeout(), None);
    }
}
