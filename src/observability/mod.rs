//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! all subsystems emit tracing events
//!     → logging.rs (ANSI/debug in verbose mode, JSON/info otherwise)
//!     → stdout (aggregation happens outside the process)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) in the default mode for machine parsing
//! - Verbosity is a pure function of one configuration flag
//! - Request IDs flow through handler spans, not through logger state

pub mod logging;
