//! Yggdrasil session-server data types.

use serde::{Deserialize, Serialize};

/// Upstream-imposed limit on usernames per `POST /api/profiles/minecraft`.
pub const MAX_PROFILE_BATCH: usize = 32;

/// A Minecraft game profile as returned by a session server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<ProfileProperty>,
}

/// A signed (or unsigned) profile property, e.g. `textures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Merged result of a batch username lookup. Order is not meaningful.
pub type ProfileBatch = Vec<Profile>;

/// Outcome of one `hasJoined` call against one upstream.
///
/// A non-200 status is a valid "not joined" answer, not an error. The decoded
/// profile is only kept when the status is 200 and both `id` and `name` are
/// non-empty, so [`JoinResult::is_joined`] reduces to a presence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinResult {
    status: u16,
    raw_body: Vec<u8>,
    upstream: String,
    profile: Option<Profile>,
}

impl JoinResult {
    pub fn new(
        upstream: impl Into<String>,
        status: u16,
        raw_body: Vec<u8>,
        decoded: Option<Profile>,
    ) -> Self {
        let profile = decoded
            .filter(|p| status == 200 && !p.id.is_empty() && !p.name.is_empty());
        Self {
            status,
            raw_body,
            upstream: upstream.into(),
            profile,
        }
    }

    /// HTTP status code the upstream answered with.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response body exactly as the upstream sent it.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    pub fn into_raw_body(self) -> Vec<u8> {
        self.raw_body
    }

    /// Name of the upstream that produced this result.
    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// True when the upstream confirmed the player joined the server.
    pub fn is_joined(&self) -> bool {
        self.profile.is_some()
    }
}
