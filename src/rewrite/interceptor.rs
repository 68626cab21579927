//! Response interception.
//!
//! A response's header block is final the moment the inner service hands the
//! response back. The interceptor runs the Set-Cookie rewrite at that point,
//! and only once per response.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::rewrite::cookie::{rewrite_set_cookie_headers, ReplacementRules};

/// Per-request rewrite guard. Never shared between requests.
#[derive(Debug)]
pub struct SetCookieInterceptor {
    rules: Arc<ReplacementRules>,
    finalized: bool,
}

impl SetCookieInterceptor {
    pub fn new(rules: Arc<ReplacementRules>) -> Self {
        Self {
            rules,
            finalized: false,
        }
    }

    /// Rewrite Set-Cookie values on the first call; later calls do nothing.
    ///
    /// Returns the number of values changed by this call.
    pub fn finalize(&mut self, headers: &mut HeaderMap) -> usize {
        if self.finalized {
            return 0;
        }
        self.finalized = true;
        rewrite_set_cookie_headers(headers, &self.rules)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}
