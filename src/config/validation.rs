//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value shapes (addresses parse, names are route-safe)
//! - Collect every failing field in one pass
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RuntimeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::RuntimeConfig;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the configuration field that failed.
    pub field: &'static str,
    /// What was wrong with it.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a fully assembled configuration.
///
/// Collects every failing field so operators can fix all problems in one
/// pass instead of replaying the startup once per mistake.
pub fn validate_config(config: &RuntimeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service_name.is_empty() {
        errors.push(ValidationError::new("service_name", "must not be empty"));
    } else if !config
        .service_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        errors.push(ValidationError::new(
            "service_name",
            format!(
                "must be lowercase alphanumeric, '-' or '_' (got {:?})",
                config.service_name
            ),
        ));
    }

    if config.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "bind_address",
            format!("not a host:port address: {:?}", config.bind_address),
        ));
    }

    if config.database_url.is_empty() {
        errors.push(ValidationError::new("database_url", "must not be empty"));
    } else if !config.database_url.contains("://") {
        errors.push(ValidationError::new(
            "database_url",
            "must be a DSN with a scheme, e.g. postgres://...",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
