//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by backend and status
//! - `gateway_request_duration_seconds` (histogram): time to response head
//! - `gateway_backend_selected_total` (counter): selections per backend
//! - `gateway_backend_load` (gauge): latest load sample per backend
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
/// Must be called from inside the tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16, backend: &str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_selected(backend: &str) {
    metrics::counter!("gateway_backend_selected_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_backend_load(backend: &str, load: f64) {
    metrics::gauge!("gateway_backend_load", "backend" => backend.to_string()).set(load);
}
