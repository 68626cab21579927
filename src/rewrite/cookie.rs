//! Set-Cookie domain substitution.
//!
//! # Responsibilities
//! - Replace `Domain=<from>` / `domain=<from>` with the configured `to`
//! - Rewrite every Set-Cookie value of a header map in place
//!
//! # Design Decisions
//! - Plain substring replacement on the raw header text; no cookie parsing
//! - Every rule is applied to every value, in configured order
//! - Count and order of Set-Cookie values never change

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::config::DomainReplacement;

/// One literal substitution, e.g. `Domain=a.review` → `Domain=a.local`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Substitution {
    needle: String,
    replacement: String,
}

/// Replacement rules with their needles built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ReplacementRules {
    substitutions: Vec<Substitution>,
}

impl ReplacementRules {
    pub fn new(replacements: &[DomainReplacement]) -> Self {
        let substitutions = replacements
            .iter()
            .flat_map(|rule| {
                ["Domain=", "domain="].map(|attr| Substitution {
                    needle: format!("{}{}", attr, rule.from),
                    replacement: format!("{}{}", attr, rule.to),
                })
            })
            .collect();

        Self { substitutions }
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.substitutions.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }

    /// Apply every rule to a single cookie string.
    pub fn rewrite_cookie(&self, cookie: &str) -> String {
        let mut modified = cookie.to_string();
        for sub in &self.substitutions {
            if modified.contains(&sub.needle) {
                modified = modified.replace(&sub.needle, &sub.replacement);
            }
        }
        modified
    }
}

/// Rewrite all Set-Cookie values in `headers`, keeping their order.
///
/// Returns how many values were changed. Values that are not valid UTF-8, or
/// whose rewritten bytes are not a legal header value, are kept as they were.
pub fn rewrite_set_cookie_headers(headers: &mut HeaderMap, rules: &ReplacementRules) -> usize {
    let cookies: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    if cookies.is_empty() {
        return 0;
    }

    headers.remove(SET_COOKIE);

    let mut changed = 0;
    for original in cookies {
        match rewrite_value(&original, rules) {
            Some(value) => {
                changed += 1;
                headers.append(SET_COOKIE, value);
            }
            None => {
                headers.append(SET_COOKIE, original);
            }
        }
    }

    changed
}

fn rewrite_value(original: &HeaderValue, rules: &ReplacementRules) -> Option<HeaderValue> {
    // obs-text (bytes >= 0x80) is legal in header values; only require UTF-8.
    let text = std::str::from_utf8(original.as_bytes()).ok()?;
    let modified = rules.rewrite_cookie(text);
    if modified == text {
        return None;
    }

    match HeaderValue::from_bytes(modified.as_bytes()) {
        Ok(mut value) => {
            value.set_sensitive(original.is_sensitive());
            Some(value)
        }
        Err(_) => {
            tracing::warn!("Rewritten Set-Cookie is not a valid header value, keeping original");
            None
        }
    }
}
