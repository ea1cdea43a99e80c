//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (kernel.rs):
//!     Validated config → bind listener → accept loop starts
//!
//! Shutdown (shutdown.rs + kernel.rs):
//!     Trigger received → stop accepting → drain connections → release
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown (repeat deliveries no-op)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logger, listeners last
//! - Ordered shutdown: stop accept, drain, close
//! - Drain has a deadline: forced close after it, still exit 0

pub mod kernel;
pub mod shutdown;
pub mod signals;

pub use kernel::{run, Kernel, KernelError, KernelOptions, KernelState, Outcome, ServerHandle};
pub use shutdown::Shutdown;
