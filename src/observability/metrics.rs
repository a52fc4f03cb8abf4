//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rawroute_requests_total` (counter): requests by method, status
//! - `rawroute_request_duration_seconds` (histogram): latency distribution
//! - `rawroute_active_connections` (gauge): current connection count

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "rawroute_requests_total";
pub const REQUEST_DURATION: &str = "rawroute_request_duration_seconds";
pub const ACTIVE_CONNECTIONS: &str = "rawroute_active_connections";

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(REQUEST_DURATION, "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn connection_opened() {
    ::metrics::gauge!(ACTIVE_CONNECTIONS).increment(1.0);
}

pub fn connection_closed() {
    ::metrics::gauge!(ACTIVE_CONNECTIONS).decrement(1.0);
}
