//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch pipeline produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request counter, latency histogram)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows in from the HTTP layer as a span field
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
