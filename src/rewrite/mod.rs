//! Set-Cookie domain rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (Host, Origin, Referer)
//!     → origin.rs (extract candidate hostnames, in priority order)
//!     → pattern.rs (anchored wildcard match against match_domains)
//!     → no match: forwarded untouched
//!     → match: inner service runs, then
//!         interceptor.rs (once per response)
//!         → cookie.rs (Domain=/domain= substitution per Set-Cookie value)
//!
//! Construction (at startup):
//!     RewriteConfig
//!     → compile patterns, precompute replacement needles
//!     → freeze as Arc<CookieDomainRewriter>
//! ```
//!
//! # Design Decisions
//! - Compiled state is immutable and shared without locks
//! - Per-request state lives only in the request's future
//! - Cookies are handled as opaque text, never parsed

pub mod cookie;
pub mod error;
pub mod interceptor;
pub mod layer;
pub mod origin;
pub mod pattern;

pub use cookie::{rewrite_set_cookie_headers, ReplacementRules};
pub use error::RewriteError;
pub use interceptor::SetCookieInterceptor;
pub use layer::{CookieDomainRewrite, CookieDomainRewriteLayer, CookieDomainRewriter};
pub use origin::{OriginClassifier, OriginSource};
pub use pattern::{DomainMatcher, DomainPattern};
