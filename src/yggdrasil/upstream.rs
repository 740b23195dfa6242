//! HTTP client for a single Yggdrasil session server.
//!
//! # Responsibilities
//! - Build one reqwest client per upstream (proxy, timeout)
//! - Translate `hasJoined` / batch profile lookups into upstream requests
//! - Decide which upstream answers are soft failures and which are errors

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::ServerConfig;
use crate::yggdrasil::error::{YggdrasilError, YggdrasilResult};
use crate::yggdrasil::server::IdentityProvider;
use crate::yggdrasil::types::{JoinResult, Profile, ProfileBatch, MAX_PROFILE_BATCH};

const USER_AGENT: &str = concat!("ymux/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for [`HttpUpstream::new`].
#[derive(Debug, Clone, Default)]
pub struct UpstreamOptions {
    /// Display name. Defaults to the API prefix.
    pub name: Option<String>,
    /// Outbound proxy URL (`http://`, `https://` or `socks5://`).
    pub proxy: Option<String>,
    /// Per-request timeout. Defaults to 10 seconds.
    pub timeout: Option<Duration>,
}

/// A session server reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    api_prefix: String,
    name: String,
}

impl HttpUpstream {
    /// Create a client for the session server rooted at `api_prefix`.
    ///
    /// Trailing slashes on the prefix are ignored.
    pub fn new(api_prefix: &str, options: UpstreamOptions) -> YggdrasilResult<Self> {
        let api_prefix = api_prefix.trim_end_matches('/').to_string();
        Url::parse(&api_prefix).map_err(|source| YggdrasilError::InvalidUrl {
            url: api_prefix.clone(),
            source,
        })?;

        let name = options
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| api_prefix.clone());

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout.unwrap_or(DEFAULT_TIMEOUT));
        if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.is_empty()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|source| YggdrasilError::Client {
                upstream: name.clone(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(|source| YggdrasilError::Client {
            upstream: name.clone(),
            source,
        })?;

        Ok(Self {
            client,
            api_prefix,
            name,
        })
    }

    /// Build an upstream from its config entry.
    pub fn from_config(config: &ServerConfig) -> YggdrasilResult<Self> {
        Self::new(
            &config.prefix,
            UpstreamOptions {
                name: config.name.clone(),
                proxy: config.proxy.clone(),
                timeout: Some(Duration::from_secs(config.timeout_secs)),
            },
        )
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    fn transport_error(&self, source: reqwest::Error) -> YggdrasilError {
        YggdrasilError::Transport {
            upstream: self.name.clone(),
            source,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpUpstream {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has_joined(&self, username: &str, server_id: &str) -> YggdrasilResult<JoinResult> {
        let endpoint = format!("{}/session/minecraft/hasJoined", self.api_prefix);
        let url = Url::parse_with_params(
            &endpoint,
            &[("username", username), ("serverId", server_id)],
        )
        .map_err(|source| YggdrasilError::InvalidUrl {
            url: endpoint.clone(),
            source,
        })?;

        tracing::debug!(upstream = %self.name, url = %url, "Sending hasJoined request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?
            .to_vec();

        // Only a 200 carries a profile; anything else means "not joined".
        let profile = if status == StatusCode::OK {
            match serde_json::from_slice::<Profile>(&body) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::error!(
                        upstream = %self.name,
                        body = %String::from_utf8_lossy(&body),
                        error = %e,
                        "Failed to decode upstream response body"
                    );
                    None
                }
            }
        } else {
            None
        };

        tracing::debug!(
            upstream = %self.name,
            status = status.as_u16(),
            raw_body = %String::from_utf8_lossy(&body),
            "Received hasJoined response"
        );

        Ok(JoinResult::new(self.name.clone(), status.as_u16(), body, profile))
    }

    async fn get_profiles(&self, usernames: &[String]) -> YggdrasilResult<ProfileBatch> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        if usernames.len() > MAX_PROFILE_BATCH {
            return Err(YggdrasilError::TooManyUsernames {
                count: usernames.len(),
                limit: MAX_PROFILE_BATCH,
            });
        }

        let url = format!("{}/api/profiles/minecraft", self.api_prefix);
        let response = self
            .client
            .post(&url)
            .json(usernames)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            tracing::error!(
                upstream = %self.name,
                body = %String::from_utf8_lossy(&body),
                status_code = status.as_u16(),
                "Upstream returned non-200 status"
            );
            return Err(YggdrasilError::Status {
                upstream: self.name.clone(),
                status: status.as_u16(),
            });
        }

        serde_json::from_slice::<ProfileBatch>(&body).map_err(|source| {
            tracing::error!(
                upstream = %self.name,
                body = %String::from_utf8_lossy(&body),
                error = %source,
                "Failed to decode upstream response body"
            );
            YggdrasilError::Decode {
                upstream: self.name.clone(),
                source,
            }
        })
    }
}
