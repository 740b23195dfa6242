//! Error definitions for upstream and multiplexed lookups.

use std::any::Any;

use thiserror::Error;
use tokio::task::JoinError;

/// Errors that can occur while querying session servers.
#[derive(Debug, Error)]
pub enum YggdrasilError {
    /// The request could not be sent or the response could not be read.
    #[error("http request to `{upstream}` failed: {source}")]
    Transport {
        upstream: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered a batch lookup with a non-200 status.
    #[error("upstream `{upstream}` returned non-200 status {status}")]
    Status { upstream: String, status: u16 },

    /// Upstream answered with a body that is not the expected JSON.
    #[error("decode response from `{upstream}`: {source}")]
    Decode {
        upstream: String,
        #[source]
        source: serde_json::Error,
    },

    /// Batch lookup exceeds the upstream limit. No request was sent.
    #[error("too many usernames: {count} exceeds the limit of {limit}")]
    TooManyUsernames { count: usize, limit: usize },

    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// HTTP client construction failed (bad proxy, TLS backend).
    #[error("build http client for `{upstream}`: {source}")]
    Client {
        upstream: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("call {operation} on server `{upstream}` failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        upstream: String,
        operation: &'static str,
        attempts: u32,
        #[source]
        source: Box<YggdrasilError>,
    },

    #[error("error querying server `{upstream}`: {source}")]
    Upstream {
        upstream: String,
        #[source]
        source: Box<YggdrasilError>,
    },

    /// A branch task panicked or was cancelled instead of returning.
    #[error("panic while querying server `{upstream}`: {message}")]
    Aborted { upstream: String, message: String },

    /// Every branch failed; carries all branch errors.
    #[error("{} upstream errors: {}", .0.len(), join_messages(.0))]
    Aggregate(Vec<YggdrasilError>),

    #[error("no upstream servers configured")]
    NoUpstreams,
}

/// Result type for session-server operations.
pub type YggdrasilResult<T> = Result<T, YggdrasilError>;

impl YggdrasilError {
    /// Attribute an error to the upstream it came from.
    pub fn upstream(upstream: impl Into<String>, source: YggdrasilError) -> Self {
        Self::Upstream {
            upstream: upstream.into(),
            source: Box::new(source),
        }
    }

    /// Convert a failed task join into an attributed error.
    pub fn aborted(upstream: impl Into<String>, err: JoinError) -> Self {
        let message = if err.is_panic() {
            panic_message(err.into_panic())
        } else {
            err.to_string()
        };
        Self::Aborted {
            upstream: upstream.into(),
            message,
        }
    }

    /// Fold several errors into one. A single error is returned unwrapped.
    pub fn combine(mut errors: Vec<YggdrasilError>) -> Self {
        match errors.len() {
            0 => Self::NoUpstreams,
            1 => errors.remove(0),
            _ => Self::Aggregate(errors),
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

fn join_messages(errors: &[YggdrasilError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_single_is_unwrapped() {
        let err = YggdrasilError::combine(vec![YggdrasilError::Status {
            upstream: "a".into(),
            status: 500,
        }]);
        assert!(matches!(err, YggdrasilError::Status { status: 500, .. }));
    }

    #[test]
    fn test_aggregate_display_lists_all() {
        let err = YggdrasilError::combine(vec![
            YggdrasilError::Status { upstream: "a".into(), status: 500 },
            YggdrasilError::TooManyUsernames { count: 33, limit: 32 },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 upstream errors"));
        assert!(msg.contains("`a` returned non-200 status 500"));
        assert!(msg.contains("33 exceeds the limit of 32"));
    }

    #[tokio::test]
    async fn test_aborted_carries_panic_message() {
        let handle = tokio::spawn(async {
            panic!("boom");
        });
        let err = handle.await.unwrap_err();
        let err = YggdrasilError::aborted("a", err);
        assert!(err.is_aborted());
        assert_eq!(err.to_string(), "panic while querying server `a`: boom");
    }
}
