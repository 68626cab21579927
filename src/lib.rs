//! Set-Cookie domain rewriting middleware and reverse proxy.
//!
//! Requests arriving for a "local" hostname (matched on Host, Origin, or
//! Referer) have the `Domain=` attribute of every `Set-Cookie` header in the
//! response rewritten, so a browser on the local variant of a site accepts
//! cookies issued for another domain.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::schema::ProxyConfig;
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
pub use rewrite::{CookieDomainRewrite, CookieDomainRewriteLayer};
