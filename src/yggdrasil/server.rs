//! The capability shared by single upstreams and the multiplexer.

use async_trait::async_trait;

use crate::yggdrasil::error::YggdrasilResult;
use crate::yggdrasil::types::{JoinResult, ProfileBatch};

/// Anything that can answer Yggdrasil session queries.
///
/// Implemented by [`HttpUpstream`](crate::yggdrasil::HttpUpstream) for one
/// session server and by [`MuxServer`](crate::yggdrasil::MuxServer) for a
/// set of them.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Human-readable, unique name used in logs and results.
    fn name(&self) -> &str;

    /// `GET /session/minecraft/hasJoined`.
    ///
    /// A "not joined" answer is `Ok` with [`JoinResult::is_joined`] false;
    /// `Err` means no answer could be obtained at all.
    async fn has_joined(&self, username: &str, server_id: &str) -> YggdrasilResult<JoinResult>;

    /// `POST /api/profiles/minecraft`.
    async fn get_profiles(&self, usernames: &[String]) -> YggdrasilResult<ProfileBatch>;
}
