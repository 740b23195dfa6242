//! Yggdrasil session-server subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → mux.rs (MuxServer: fan-out, first-positive-wins, merge)
//!     → retries (fixed-delay retry per branch)
//!     → upstream.rs (HttpUpstream: one session server over HTTP)
//!     → types.rs (JoinResult, Profile)
//! ```
//!
//! Both [`HttpUpstream`] and [`MuxServer`] implement [`IdentityProvider`],
//! so the HTTP front-end never knows how many upstreams sit behind it.

pub mod error;
pub mod mux;
pub mod server;
pub mod types;
pub mod upstream;

pub use error::{YggdrasilError, YggdrasilResult};
pub use mux::{BranchOutcome, MuxServer};
pub use server::IdentityProvider;
pub use types::{JoinResult, Profile, ProfileBatch, ProfileProperty, MAX_PROFILE_BATCH};
pub use upstream::{HttpUpstream, UpstreamOptions};
