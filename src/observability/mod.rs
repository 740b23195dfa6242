//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log stream
//!     → `/metrics` endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Upstream name, username and serverId are structured fields, never
//!   interpolated into messages
//! - Request ID flows through every HTTP span
//! - Metrics are opt-in via config

pub mod logging;
pub mod metrics;
