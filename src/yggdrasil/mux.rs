//! Fan-out of session queries across several upstream servers.
//!
//! # Data Flow
//! ```text
//! has_joined(username, server_id)
//!     → one task per upstream: RetryPolicy(upstream.has_joined)
//!     → results → bounded mpsc (capacity = upstream count)
//!     → consumer returns the first joined result
//!     → drain task awaits every branch, closes the channel and
//!       reports panicked branches over a oneshot
//!
//! get_profiles(usernames)
//!     → one task per upstream
//!     → barrier on all tasks
//!     → any error: combined error, no partial data
//!     → otherwise: concatenated batches
//! ```
//!
//! # Design Decisions
//! - Stragglers are not cancelled after an early return; the drain task
//!   keeps owning them and the per-request HTTP timeout bounds their lifetime
//! - A panicking branch never takes the caller down with it; it becomes
//!   [`YggdrasilError::Aborted`]

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};

use crate::config::MuxConfig;
use crate::resilience::retries::RetryPolicy;
use crate::yggdrasil::error::{YggdrasilError, YggdrasilResult};
use crate::yggdrasil::server::IdentityProvider;
use crate::yggdrasil::types::{JoinResult, ProfileBatch};
use crate::yggdrasil::upstream::HttpUpstream;

/// What one branch reports back to the mux.
#[derive(Debug)]
pub enum BranchOutcome<T> {
    /// The upstream answered.
    Ok(T),
    /// The upstream call returned an error.
    Err(YggdrasilError),
    /// The branch task panicked or was cancelled.
    Aborted(YggdrasilError),
}

impl<T> BranchOutcome<T> {
    /// Classify a joined branch task.
    pub fn from_join(upstream: &str, joined: Result<YggdrasilResult<T>, JoinError>) -> Self {
        match joined {
            Ok(Ok(value)) => Self::Ok(value),
            Ok(Err(e)) => Self::Err(e),
            Err(e) => Self::Aborted(YggdrasilError::aborted(upstream, e)),
        }
    }
}

/// A composite [`IdentityProvider`] over an ordered set of upstreams.
pub struct MuxServer {
    servers: Vec<Arc<dyn IdentityProvider>>,
    retry: RetryPolicy,
    name: String,
}

impl MuxServer {
    pub fn new(servers: Vec<Arc<dyn IdentityProvider>>) -> Self {
        let name = format!(
            "mux[{}]",
            servers.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
        );
        Self {
            servers,
            retry: RetryPolicy::default(),
            name,
        }
    }

    /// Replace the per-branch retry policy used by `has_joined`.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build a mux with one [`HttpUpstream`] per configured server.
    pub fn from_config(config: &MuxConfig) -> YggdrasilResult<Self> {
        let mut servers: Vec<Arc<dyn IdentityProvider>> = Vec::with_capacity(config.servers.len());
        for server in &config.servers {
            let upstream = HttpUpstream::from_config(server)
                .map_err(|e| YggdrasilError::upstream(server.display_name(), e))?;
            tracing::info!(
                upstream = %upstream.name(),
                prefix = %upstream.api_prefix(),
                proxy = server.proxy.as_deref().unwrap_or("none"),
                "Upstream configured"
            );
            servers.push(Arc::new(upstream));
        }
        Ok(Self::new(servers))
    }

    pub fn servers(&self) -> &[Arc<dyn IdentityProvider>] {
        &self.servers
    }
}

#[async_trait]
impl IdentityProvider for MuxServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has_joined(&self, username: &str, server_id: &str) -> YggdrasilResult<JoinResult> {
        if self.servers.is_empty() {
            return Err(YggdrasilError::NoUpstreams);
        }

        let (results_tx, mut results_rx) = mpsc::channel(self.servers.len());
        let mut branches = Vec::with_capacity(self.servers.len());
        for server in &self.servers {
            let server = Arc::clone(server);
            let results_tx = results_tx.clone();
            let retry = self.retry;
            let username = username.to_string();
            let server_id = server_id.to_string();
            let name = server.name().to_string();
            let handle = tokio::spawn(async move {
                let outcome = retry
                    .run(server.name(), "hasJoined", || {
                        server.has_joined(&username, &server_id)
                    })
                    .await;
                // Capacity matches the branch count, so this never waits.
                // A closed channel means the caller already returned.
                let _ = results_tx.send(outcome).await;
            });
            branches.push((name, handle));
        }

        let (aborted_tx, aborted_rx) = oneshot::channel();
        tokio::spawn(drain(branches, results_tx, aborted_tx));

        let mut last = None;
        let mut errors = Vec::new();
        // Panicked branches never send here; the drain task reports them.
        while let Some(outcome) = results_rx.recv().await {
            match outcome {
                Ok(result) => {
                    if result.is_joined() {
                        return Ok(result);
                    }
                    last = Some(result);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Upstream hasJoined query failed");
                    errors.push(e);
                }
            }
        }

        if let Some(result) = last {
            return Ok(result);
        }

        // Nothing succeeded. Prefer the panic report if there is one.
        match aborted_rx.await {
            Ok(Some(fault)) => {
                tracing::error!(error = %fault, "No upstream answered and a hasJoined branch terminated abnormally");
                Err(fault)
            }
            _ => Err(YggdrasilError::combine(errors)),
        }
    }

    async fn get_profiles(&self, usernames: &[String]) -> YggdrasilResult<ProfileBatch> {
        if self.servers.is_empty() {
            return Err(YggdrasilError::NoUpstreams);
        }

        let (names, handles): (Vec<String>, Vec<JoinHandle<YggdrasilResult<ProfileBatch>>>) = self
            .servers
            .iter()
            .map(|server| {
                let server = Arc::clone(server);
                let usernames = usernames.to_vec();
                let name = server.name().to_string();
                let handle = tokio::spawn(async move { server.get_profiles(&usernames).await });
                (name, handle)
            })
            .unzip();

        let mut merged = Vec::new();
        let mut errors = Vec::new();
        for (name, joined) in names.iter().zip(join_all(handles).await) {
            match BranchOutcome::from_join(name, joined) {
                BranchOutcome::Ok(batch) => merged.extend(batch),
                BranchOutcome::Err(e) => errors.push(YggdrasilError::upstream(name.as_str(), e)),
                BranchOutcome::Aborted(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            let err = YggdrasilError::combine(errors);
            tracing::error!(error = %err, "Profile lookup failed");
            return Err(err);
        }
        Ok(merged)
    }
}

/// Await every branch, then close the result channel by dropping the last
/// sender. Panicked branches are reported on `aborted`, never on `results`.
async fn drain(
    branches: Vec<(String, JoinHandle<()>)>,
    results: mpsc::Sender<YggdrasilResult<JoinResult>>,
    aborted: oneshot::Sender<Option<YggdrasilError>>,
) {
    let mut faults = Vec::new();
    for (name, handle) in branches {
        if let BranchOutcome::Aborted(e) = BranchOutcome::from_join(&name, handle.await.map(Ok)) {
            tracing::error!(error = %e, "Branch terminated abnormally");
            faults.push(e);
        }
    }
    drop(results);
    let fault = (!faults.is_empty()).then(|| YggdrasilError::combine(faults));
    let _ = aborted.send(fault);
}
