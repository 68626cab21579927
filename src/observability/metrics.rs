//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define rewrite metrics
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `cookie_rewrite_requests_total` (counter): requests by decision (matched, passthrough)
//! - `cookie_rewrite_cookies_total` (counter): Set-Cookie values whose domain was rewritten
//! - `cookie_rewrite_upstream_errors_total` (counter): failed upstream requests

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(matched: bool) {
    let decision = if matched { "matched" } else { "passthrough" };
    metrics::counter!("cookie_rewrite_requests_total", "decision" => decision).increment(1);
}

pub fn record_cookies_rewritten(count: usize) {
    metrics::counter!("cookie_rewrite_cookies_total").increment(count as u64);
}

pub fn record_upstream_error() {
    metrics::counter!("cookie_rewrite_upstream_errors_total").increment(1);
}
