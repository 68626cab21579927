//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout)
//!     → rewrite layer (classify origin, intercept response)
//!     → proxy handler (forward to upstream)
//!     → upstream response, Set-Cookie rewritten on the way out
//!     → Send to client
//! ```

pub mod server;

pub use server::{ProxyServer, ServerError};
