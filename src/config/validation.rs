//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and timeout ranges
//! - Check that the rewrite section can be compiled
//! - Flag rewrite rules that are legal but suspicious (warnings, not errors)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::{ProxyConfig, RewriteConfig};
use crate::rewrite::pattern::DomainPattern;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("upstream.address must not be empty")]
    EmptyUpstream,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("rewrite.replacements must contain at least one rule")]
    NoReplacements,

    #[error("rewrite.match_domains pattern '{pattern}' is invalid: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// A rewrite rule that is accepted but probably not what was meant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleWarning {
    #[error("rewrite.replacements[{0}].from is empty and matches every bare Domain= attribute")]
    EmptyFrom(usize),

    #[error("rewrite.replacements[{index}].to '{to}' is not valid in a header value, cookies it touches are left unchanged")]
    IllegalTo { index: usize, to: String },
}

/// Validate the whole configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.upstream.address.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstream);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    errors.extend(validate_rewrite(&config.rewrite));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks for the rewrite section alone.
pub fn validate_rewrite(rewrite: &RewriteConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if rewrite.replacements.is_empty() {
        errors.push(ValidationError::NoReplacements);
    }

    for pattern in &rewrite.match_domains {
        if let Err(e) = DomainPattern::compile(pattern) {
            errors.push(ValidationError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
    }

    errors
}

/// Rules that load fine but will behave surprisingly at runtime.
pub fn rule_warnings(rewrite: &RewriteConfig) -> Vec<RuleWarning> {
    let mut warnings = Vec::new();

    for (index, rule) in rewrite.replacements.iter().enumerate() {
        if rule.from.is_empty() {
            warnings.push(RuleWarning::EmptyFrom(index));
        }
        // `to` ends up verbatim inside a Set-Cookie value.
        if HeaderValue::from_bytes(rule.to.as_bytes()).is_err() {
            warnings.push(RuleWarning::IllegalTo {
                index,
                to: rule.to.clone(),
            });
        }
    }

    warnings
}
