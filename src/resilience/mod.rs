//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Branch call to one upstream:
//!     → retries.rs (fixed delay, bounded attempts)
//!     → per-request timeout is enforced by the upstream's HTTP client
//! ```
//!
//! # Design Decisions
//! - Retries are per upstream branch, never across the whole fan-out
//! - The attempt cap bounds how long a straggler can outlive its caller

pub mod retries;

pub use retries::RetryPolicy;
