//! Metrics collection and exposition.
//!
//! # Metrics
//! - `waitlist_requests_total` (counter): requests by endpoint and outcome
//! - `waitlist_request_duration_seconds` (histogram): latency by endpoint
//! - `waitlist_rate_limited_total` (counter): rejected signup attempts
//! - `waitlist_tracked_clients` (gauge): addresses held by the rate limiter
//! - `waitlist_store_errors_total` (counter): store failures by operation
//!
//! Without an installed recorder every call here is a no-op, so handlers and
//! tests never need to know whether the exporter is running.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(endpoint: &'static str, outcome: &'static str, start: Instant) {
    counter!("waitlist_requests_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
    histogram!("waitlist_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("waitlist_rate_limited_total").increment(1);
}

pub fn record_tracked_clients(count: usize) {
    gauge!("waitlist_tracked_clients").set(count as f64);
}

pub fn record_store_error(operation: &'static str) {
    counter!("waitlist_store_errors_total", "operation" => operation).increment(1);
}
