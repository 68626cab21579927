//! Tower middleware wiring.
//!
//! # Responsibilities
//! - Compile a `RewriteConfig` once into shared, immutable state
//! - Wrap any downstream service; classify each request
//! - Pass non-matching requests through untouched
//! - Intercept matching responses and rewrite their Set-Cookie values
//!
//! # Design Decisions
//! - Construction fails fast on bad configuration
//! - No locks: compiled state is behind an Arc and never mutated
//! - Inner service errors propagate unchanged

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::config::validation::rule_warnings;
use crate::config::RewriteConfig;
use crate::observability::metrics;
use crate::rewrite::cookie::ReplacementRules;
use crate::rewrite::error::RewriteError;
use crate::rewrite::interceptor::SetCookieInterceptor;
use crate::rewrite::origin::{OriginClassifier, OriginSource};
use crate::rewrite::pattern::DomainMatcher;

/// Compiled rewrite configuration, shared by every request.
#[derive(Debug)]
pub struct CookieDomainRewriter {
    classifier: OriginClassifier,
    rules: Arc<ReplacementRules>,
}

impl CookieDomainRewriter {
    pub fn new(config: &RewriteConfig) -> Result<Self, RewriteError> {
        if config.replacements.is_empty() {
            return Err(RewriteError::NoReplacements);
        }

        let matcher = DomainMatcher::compile(config.match_domains.as_slice())?;
        if matcher.is_empty() {
            tracing::warn!("No match domains configured, Set-Cookie headers will never be rewritten");
        }
        for warning in rule_warnings(config) {
            tracing::warn!("{}", warning);
        }

        tracing::info!(
            match_domains = ?config.match_domains,
            replacements = config.replacements.len(),
            "Cookie domain rewriter configured"
        );

        Ok(Self {
            classifier: OriginClassifier::new(matcher),
            rules: Arc::new(ReplacementRules::new(&config.replacements)),
        })
    }

    pub fn should_rewrite<B>(&self, req: &Request<B>) -> bool {
        self.classifier.should_rewrite(req)
    }

    pub fn classify<B>(&self, req: &Request<B>) -> Option<OriginSource> {
        self.classifier.classify(req)
    }

    /// Fresh interceptor for one matching request.
    pub fn interceptor(&self) -> SetCookieInterceptor {
        SetCookieInterceptor::new(self.rules.clone())
    }
}

/// Layer applying [`CookieDomainRewrite`] to a service.
#[derive(Debug, Clone)]
pub struct CookieDomainRewriteLayer {
    rewriter: Arc<CookieDomainRewriter>,
}

impl CookieDomainRewriteLayer {
    pub fn new(config: &RewriteConfig) -> Result<Self, RewriteError> {
        Ok(Self {
            rewriter: Arc::new(CookieDomainRewriter::new(config)?),
        })
    }

    pub fn from_rewriter(rewriter: Arc<CookieDomainRewriter>) -> Self {
        Self { rewriter }
    }
}

impl<S> Layer<S> for CookieDomainRewriteLayer {
    type Service = CookieDomainRewrite<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CookieDomainRewrite {
            inner,
            rewriter: self.rewriter.clone(),
        }
    }
}

/// Middleware service rewriting Set-Cookie domains for "local" requests.
#[derive(Debug, Clone)]
pub struct CookieDomainRewrite<S> {
    inner: S,
    rewriter: Arc<CookieDomainRewriter>,
}

impl<S> CookieDomainRewrite<S> {
    /// Wrap `inner` with a rewriter built from `config`.
    pub fn new(inner: S, config: &RewriteConfig) -> Result<Self, RewriteError> {
        Ok(Self {
            inner,
            rewriter: Arc::new(CookieDomainRewriter::new(config)?),
        })
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CookieDomainRewrite<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let source = match self.rewriter.classify(&req) {
            Some(source) => source,
            None => {
                metrics::record_decision(false);
                return Box::pin(self.inner.call(req));
            }
        };

        tracing::debug!(
            matched_on = %source,
            path = %req.uri().path(),
            "Request matched local domain, intercepting Set-Cookie"
        );
        metrics::record_decision(true);

        let mut interceptor = self.rewriter.interceptor();
        let future = self.inner.call(req);

        Box::pin(async move {
            let mut response = future.await?;
            let rewritten = interceptor.finalize(response.headers_mut());
            if rewritten > 0 {
                tracing::debug!(rewritten, "Rewrote Set-Cookie domains");
                metrics::record_cookies_rewritten(rewritten);
            }
            Ok(response)
        })
    }
}
