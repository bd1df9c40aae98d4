//! Metrics collection and exposition.
//!
//! # Metrics
//! - `render_requests_total` (counter): requests by status and outcome
//! - `render_duration_seconds` (histogram): end-to-end handler latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one handled request.
pub fn record_render(status: u16, outcome: &'static str, start: Instant) {
    ::metrics::counter!(
        "render_requests_total",
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("render_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
