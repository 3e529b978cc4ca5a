//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define dispatch metrics (request count by outcome, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by outcome, method
//! - `dispatch_duration_seconds` (histogram): dispatch latency by outcome
//!
//! # Design Decisions
//! - Outcome labels: `ok`, `denied`, `not_found`, `method_not_allowed`
//! - Method labels are the supported verbs; anything else is `OTHER`

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::HttpMethod;

pub const REQUESTS_TOTAL: &str = "dispatch_requests_total";
pub const DURATION_SECONDS: &str = "dispatch_duration_seconds";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(address: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(address).install()?;

    describe_counter!(REQUESTS_TOTAL, "Dispatched requests by outcome and method");
    describe_histogram!(DURATION_SECONDS, Unit::Seconds, "Time spent dispatching one request");

    tracing::info!(%address, "Metrics endpoint listening");
    Ok(())
}

pub fn record_dispatch(method: &str, outcome: &'static str, elapsed: Duration) {
    counter!(REQUESTS_TOTAL, "outcome" => outcome, "method" => method_label(method)).increment(1);
    histogram!(DURATION_SECONDS, "outcome" => outcome).record(elapsed.as_secs_f64());
}

/// Bounded label for a client-supplied verb.
pub fn method_label(method: &str) -> &'static str {
    method
        .parse::<HttpMethod>()
        .map(|m| m.as_str())
        .unwrap_or("OTHER")
}
