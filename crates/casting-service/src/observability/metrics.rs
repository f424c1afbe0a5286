//! Metrics definitions for the casting service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `casting_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: HTTP methods
//! - `endpoint`: parameterized route templates, unknown paths become `/other`
//! - `outcome`: `success` or an `AuthError` code
//! - `status`: `success` or `error`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize the Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if the Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("casting_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Key set fetches are bounded by the fetch timeout (at most 60s)
        .set_buckets_for_metric(
            Matcher::Prefix("casting_jwks_fetch".to_string()),
            &[0.010, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000],
        )
        .map_err(|e| format!("Failed to set JWKS fetch buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion.
///
/// Metric: `casting_http_requests_total`, `casting_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status_code` / `status`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("casting_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("casting_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion.
///
/// Numeric ids are replaced with placeholders matching the route templates.
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/metrics" | "/movies" | "/actors" => path.to_string(),
        _ => normalize_dynamic_endpoint(path),
    }
}

fn normalize_dynamic_endpoint(path: &str) -> String {
    let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    let normalized = match parts.as_slice() {
        ["movies", _] => "/movies/{id}",
        ["movies", _, "actors"] => "/movies/{id}/actors",
        ["movies", _, "actors", _] => "/movies/{id}/actors/{actor_id}",
        ["actors", _] => "/actors/{id}",
        _ => "/other",
    };

    normalized.to_string()
}

// ============================================================================
// Authorization Metrics
// ============================================================================

/// Record the outcome of one pass through the auth gate.
///
/// Metric: `casting_auth_outcomes_total`
/// Labels: `outcome` (`success` or the failure code)
pub fn record_auth_outcome(outcome: &str) {
    counter!("casting_auth_outcomes_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record one key set fetch.
///
/// Metric: `casting_jwks_fetch_total`, `casting_jwks_fetch_duration_seconds`
/// Labels: `status` (`success` or `error`)
pub fn record_jwks_fetch(status: &str, duration: Duration) {
    histogram!("casting_jwks_fetch_duration_seconds").record(duration.as_secs_f64());

    counter!("casting_jwks_fetch_total",
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================
