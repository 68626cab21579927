use thiserror::Error;

/// Errors raised while building a rewriter from configuration.
///
/// Request handling itself never fails; these only surface at startup.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("no replacements configured")]
    NoReplacements,

    #[error("invalid match domain pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
