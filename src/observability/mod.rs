//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Server, framer, dispatcher produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID appears on every per-request log line
//! - Metrics calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
