//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional override file (TOML, silently skipped when absent)
//!     → SVC_* environment variables
//!     → validation.rs (semantic checks, all errors collected)
//!     → RuntimeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults so a minimal environment still assembles
//! - Validation reports every failing field, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_from, ConfigError};
pub use schema::RuntimeConfig;
pub use validation::ValidationError;
