//! Lifecycle kernel for long-running HTTP services.
//!
//! Owns the start/stop state machine of one foreground listener per
//! process: validated configuration in, structured logger up, listener
//! bound, requests served until a termination signal (or a serving
//! failure), then an ordered, time-bounded graceful shutdown that decides
//! the process exit code.
//!
//! # Control Flow
//!
//! ```text
//! config::load()                 validated, immutable RuntimeConfig
//!     → logging::init(verbose)   ANSI/debug or JSON/info subscriber
//!     → Router assembly          introspection + middleware + business routes
//!     → lifecycle::run(...)      bind → serve + signal watcher
//!                                    → stop accepting → drain (deadline)
//!                                    → release → exit code
//! ```
//!
//! Storage, domain validation, templating and mail delivery are external
//! collaborators: the kernel only sees a request-handling `Router`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RuntimeConfig;
pub use http::BuildInfo;
pub use lifecycle::{Kernel, KernelOptions, KernelState, Outcome, ServerHandle, Shutdown};
