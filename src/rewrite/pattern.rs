//! Wildcard hostname patterns.
//!
//! # Responsibilities
//! - Compile `*.local` style patterns into anchored regexes
//! - Match a candidate hostname against the configured set
//!
//! # Design Decisions
//! - Everything except `*` is matched literally
//! - Patterns are anchored to the whole candidate
//! - Matching is case-sensitive; hostnames are compared as received

use regex::Regex;

use crate::rewrite::error::RewriteError;

/// One compiled `match_domains` entry.
#[derive(Debug, Clone)]
pub struct DomainPattern {
    regex: Regex,
}

impl DomainPattern {
    /// Compile a wildcard pattern. `*` matches any run of zero or more characters.
    pub fn compile(pattern: &str) -> Result<Self, RewriteError> {
        let body = regex::escape(pattern).replace(r"\*", ".*");
        let regex = Regex::new(&format!("^{}$", body)).map_err(|source| {
            RewriteError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self { regex })
    }

    pub fn matches(&self, hostname: &str) -> bool {
        self.regex.is_match(hostname)
    }
}

/// Ordered set of patterns; a hostname matches if any pattern does.
#[derive(Debug, Clone, Default)]
pub struct DomainMatcher {
    patterns: Vec<DomainPattern>,
}

impl DomainMatcher {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, RewriteError> {
        let patterns = patterns
            .iter()
            .map(|p| DomainPattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, hostname: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(hostname))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}
