//! Error types for the Spotify Web API client.

use std::time::Duration;

use thiserror::Error;

/// Main error type for all Spotify operations.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// The request never produced an HTTP response (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human-readable message extracted from the error body.
        message: String,
        /// Raw response body.
        body: String,
        /// Value of the `Retry-After` header, if the server sent one.
        retry_after: Option<Duration>,
    },

    /// Token exchange or refresh was rejected. The caller has to re-authenticate.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Still rate limited after the one permitted retry.
    #[error("Rate limited: retry after {retry_after:?}")]
    RateLimited {
        /// The server's last requested backoff.
        retry_after: Option<Duration>,
    },

    /// A split bulk operation failed partway through.
    #[error("Batch failed after {completed_count} items: {source}")]
    PartialBatch {
        /// Number of items applied before the failing call.
        completed_count: usize,
        /// Error returned by the failing call.
        #[source]
        source: Box<SpotifyError>,
    },

    /// JSON payload did not match the expected model.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input rejected before any request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpotifyError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SpotifyError::Http { status, .. } => Some(*status),
            SpotifyError::Transport(e) => e.status().map(|s| s.as_u16()),
            SpotifyError::PartialBatch { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether the resource does not exist (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether backing off and retrying later may succeed.
    ///
    /// Authentication failures and malformed requests return `false`.
    pub fn is_retryable(&self) -> bool {
        match self {
            SpotifyError::RateLimited { .. } => true,
            SpotifyError::Transport(e) => e.is_timeout() || e.is_connect(),
            SpotifyError::Http { status, .. } => *status >= 500,
            SpotifyError::PartialBatch { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    pub(crate) fn http(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        SpotifyError::Http {
            status,
            message: error_message(&body).unwrap_or_else(|| format!("status {}", status)),
            body,
            retry_after: None,
        }
    }
}

/// Pull the human-readable message out of an API or accounts error body.
///
/// The Web API nests it under `error.message`; the accounts service uses
/// `error_description` next to a string `error` code.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = match json.get("error") {
        Some(serde_json::Value::Object(err)) => err
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
        _ => json
            .get("error_description")
            .or_else(|| json.get("error"))
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
    };
    message.filter(|m| !m.trim().is_empty())
}

/// Result type alias for Spotify operations.
pub type Result<T> = std::result::Result<T, SpotifyError>;
