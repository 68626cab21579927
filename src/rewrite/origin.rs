//! Request origin classification.
//!
//! # Responsibilities
//! - Extract candidate hostnames from Host, Origin and Referer
//! - Decide whether a request came from a "local" domain
//!
//! # Design Decisions
//! - Priority order is Host, then Origin, then Referer; first match wins
//! - Host falls back to the URI authority (HTTP/2 `:authority`)
//! - Empty or non-UTF-8 header values count as absent; other non-ASCII
//!   bytes (e.g. in a Referer path) are fine

use std::fmt;

use axum::http::{header, HeaderMap, Request};

use crate::rewrite::pattern::DomainMatcher;

/// Which part of the request produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginSource {
    Host,
    Origin,
    Referer,
}

impl fmt::Display for OriginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OriginSource::Host => "host",
            OriginSource::Origin => "origin",
            OriginSource::Referer => "referer",
        };
        f.write_str(name)
    }
}

/// Decides per request whether Set-Cookie rewriting applies.
#[derive(Debug, Clone)]
pub struct OriginClassifier {
    matcher: DomainMatcher,
}

impl OriginClassifier {
    pub fn new(matcher: DomainMatcher) -> Self {
        Self { matcher }
    }

    pub fn should_rewrite<B>(&self, req: &Request<B>) -> bool {
        self.classify(req).is_some()
    }

    /// Returns the first source whose hostname matches, if any.
    pub fn classify<B>(&self, req: &Request<B>) -> Option<OriginSource> {
        if let Some(host) = request_host(req) {
            if self.matcher.matches(strip_port(host)) {
                return Some(OriginSource::Host);
            }
        }

        if let Some(origin) = header_str(req.headers(), header::ORIGIN) {
            if self.matcher.matches(url_hostname(origin)) {
                return Some(OriginSource::Origin);
            }
        }

        if let Some(referer) = header_str(req.headers(), header::REFERER) {
            if self.matcher.matches(url_hostname(referer)) {
                return Some(OriginSource::Referer);
            }
        }

        None
    }
}

fn request_host<B>(req: &Request<B>) -> Option<&str> {
    header_str(req.headers(), header::HOST).or_else(|| {
        req.uri()
            .authority()
            .map(|a| a.as_str())
            .filter(|a| !a.is_empty())
    })
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .filter(|v| !v.is_empty())
}

/// Drop a `:port` suffix. The last colon delimits host from port.
pub fn strip_port(host: &str) -> &str {
    match host.rfind(':') {
        Some(idx) => &host[..idx],
        None => host,
    }
}

/// Hostname of an Origin/Referer value: scheme removed, then cut at the
/// first `:` or `/`.
pub fn url_hostname(value: &str) -> &str {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .unwrap_or(value);

    match rest.find([':', '/']) {
        Some(idx) => &rest[..idx],
        None => rest,
    }
}
