//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - At least one upstream, each with a parseable prefix
//! - Validate optional values (proxy URL, timeout > 0)
//! - Detect duplicate upstream names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MuxConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::MuxConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no yggdrasil server specified")]
    NoServers,

    #[error("missing prefix for yggdrasil server `{0}`")]
    MissingPrefix(String),

    #[error("invalid prefix for yggdrasil server `{name}`: {reason}")]
    InvalidPrefix { name: String, reason: String },

    #[error("invalid proxy for yggdrasil server `{name}`: {reason}")]
    InvalidProxy { name: String, reason: String },

    #[error("timeout for yggdrasil server `{0}` must be greater than zero")]
    ZeroTimeout(String),

    #[error("duplicate yggdrasil server name `{0}`")]
    DuplicateName(String),
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &MuxConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    let mut seen = HashSet::new();
    for (index, server) in config.servers.iter().enumerate() {
        let name = match server.name.as_deref() {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("#{index}"),
        };

        if server.prefix.trim().is_empty() {
            errors.push(ValidationError::MissingPrefix(name.clone()));
        } else if let Err(e) = Url::parse(server.prefix.trim_end_matches('/')) {
            errors.push(ValidationError::InvalidPrefix {
                name: name.clone(),
                reason: e.to_string(),
            });
        }

        if let Some(proxy) = server.proxy.as_deref().filter(|p| !p.is_empty()) {
            if let Err(e) = Url::parse(proxy) {
                errors.push(ValidationError::InvalidProxy {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if server.timeout_secs == 0 {
            errors.push(ValidationError::ZeroTimeout(name.clone()));
        }

        if !server.prefix.is_empty() && !seen.insert(server.display_name()) {
            errors.push(ValidationError::DuplicateName(server.display_name()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
