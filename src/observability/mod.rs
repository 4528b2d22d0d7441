//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and background tasks produce:
//!     → logging.rs (structured tracing events, pretty or JSON)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (log aggregation)
//!     → Prometheus scrape endpoint
//! ```
//!
//! Request IDs are attached by `http::request` and show up on the
//! `TraceLayer` span of every request.

pub mod logging;
pub mod metrics;
