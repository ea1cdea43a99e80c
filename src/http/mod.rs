//! HTTP surface shared by services.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → middleware.rs (request ID stamped, echoed on response)
//!     → recover.rs (per-request panic safety net)
//!     → introspection.rs (/health, /<service>/about)
//!     → business routes (owned by the service assembler)
//! ```

pub mod introspection;
pub mod middleware;
pub mod recover;

pub use introspection::BuildInfo;
pub use middleware::X_REQUEST_ID;
