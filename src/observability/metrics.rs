//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failover_health_queries_total` (counter): status queries by endpoint, outcome
//! - `failover_decisions_total` (counter): routing decisions by target
//! - `failover_dispatch_duration_seconds` (histogram): time spent deciding
//! - `failover_upstream_errors_total` (counter): forwarding failures by upstream host

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one health query; `outcome` is `healthy`, `unhealthy` or `query_error`.
pub fn record_health_query(endpoint: &'static str, outcome: &'static str) {
    counter!("failover_health_queries_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// Record a routing decision; `target` is `primary`, `secondary` or `none`.
pub fn record_decision(target: &'static str, start: Instant) {
    counter!("failover_decisions_total", "target" => target).increment(1);
    histogram!("failover_dispatch_duration_seconds", "target" => target).record(start.elapsed().as_secs_f64());
}

/// Record a request that was routed but could not be delivered upstream.
pub fn record_upstream_error(host: String) {
    counter!("failover_upstream_errors_total", "host" => host).increment(1);
}
