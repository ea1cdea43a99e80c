//! Configuration loading from environment and optional override file.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::RuntimeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the override file. Falls back to
/// `./service.toml` when unset.
pub const CONFIG_FILE_VAR: &str = "SVC_CONFIG_FILE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from the process environment.
///
/// The override file (from `SVC_CONFIG_FILE`, else `./service.toml`) is read
/// at most once and silently skipped when absent.
pub fn load() -> Result<RuntimeConfig, ConfigError> {
    let file = env::var(CONFIG_FILE_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("service.toml"));
    let vars: HashMap<String, String> = env::vars().collect();
    load_from(Some(&file), &vars)
}

/// Load and validate configuration from an explicit file and variable map.
///
/// Precedence, lowest to highest: built-in defaults, the override file,
/// `SVC_*` variables. A file that exists but does not parse is a hard error;
/// an absent file is not. Unparseable variable values and semantic failures
/// are collected together so every broken field is reported in one pass.
pub fn load_from(
    file: Option<&Path>,
    vars: &HashMap<String, String>,
) -> Result<RuntimeConfig, ConfigError> {
    let mut config = match file {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        _ => RuntimeConfig::default(),
    };

    let mut errors = apply_env_overrides(&mut config, vars);
    if let Err(semantic) = validate_config(&config) {
        errors.extend(semantic);
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

/// Apply `SVC_*` overrides onto `config`, returning type errors for values
/// that do not coerce. String-typed fields cannot fail here; their semantic
/// checks run in validation.
fn apply_env_overrides(
    config: &mut RuntimeConfig,
    vars: &HashMap<String, String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(v) = vars.get("SVC_SERVICE_NAME") {
        config.service_name = v.clone();
    }
    if let Some(v) = vars.get("SVC_BIND_ADDRESS") {
        config.bind_address = v.clone();
    }
    if let Some(v) = vars.get("SVC_DATABASE_URL") {
        config.database_url = v.clone();
    }
    if let Some(v) = vars.get("SVC_FEATURES") {
        config.features = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(v) = vars.get("SVC_VERBOSE") {
        match parse_bool(v) {
            Some(b) => config.verbose = b,
            None => errors.push(ValidationError::new(
                "verbose",
                format!("not a boolean: {:?}", v),
            )),
        }
    }
    if let Some(v) = vars.get("SVC_SHUTDOWN_GRACE_SECS") {
        match v.parse::<u64>() {
            Ok(n) => config.shutdown_grace_secs = n,
            Err(_) => errors.push(ValidationError::new(
                "shutdown_grace_secs",
                format!("not a non-negative integer: {:?}", v),
            )),
        }
    }

    errors
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
