//! Retry logic.
//!
//! # Responsibilities
//! - Re-run a failed upstream call a bounded number of times
//! - Wait a fixed delay between attempts (no growth, no jitter)
//! - Annotate the final error with upstream, operation and attempt count
//!
//! Only `Err` is retried. A successful "not joined" answer is terminal.

use std::future::Future;
use std::time::Duration;

use crate::yggdrasil::error::{YggdrasilError, YggdrasilResult};

/// Attempts per upstream call, including the first one.
pub const MAX_ATTEMPTS: u32 = 3;

/// Pause between two attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A policy making at most `attempts` calls, `delay` apart.
    pub const fn fixed(attempts: u32, delay: Duration) -> Self {
        let attempts = if attempts == 0 { 1 } else { attempts };
        Self { attempts, delay }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `call` until it succeeds or attempts run out.
    pub async fn run<T, F, Fut>(
        &self,
        upstream: &str,
        operation: &'static str,
        mut call: F,
    ) -> YggdrasilResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = YggdrasilResult<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts => {
                    tracing::warn!(
                        upstream = %upstream,
                        operation,
                        attempt,
                        delay = ?self.delay,
                        error = %e,
                        "Upstream call failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    return Err(YggdrasilError::RetriesExhausted {
                        upstream: upstream.to_string(),
                        operation,
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(MAX_ATTEMPTS, RETRY_INTERVAL)
    }
}
