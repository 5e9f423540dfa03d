//! Metrics collection and exposition.
//!
//! # Metrics
//! - `story_requests_total` (counter): requests by method, route, status
//! - `story_request_duration_seconds` (histogram): latency distribution
//! - `story_upstream_retries_total` (counter): retries by operation
//! - `story_upstream_failures_total` (counter): terminal failures by operation
//! - `story_cache_lookups_total` (counter): cache reads by result (hit/miss)
//! - `story_subscriptions_expired_total` (counter): users cleared by the sweep
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();
    let status = status.to_string();

    counter!(
        "story_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "story_request_duration_seconds",
        "method" => method,
        "route" => route,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_retry(operation: &str) {
    counter!("story_upstream_retries_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_upstream_failure(operation: &str) {
    counter!("story_upstream_failures_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("story_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_subscriptions_expired(count: usize) {
    counter!("story_subscriptions_expired_total").increment(count as u64);
}
