//! Error types for the Raindrop.io client.
//!
//! Errors fall into a few groups: request construction (nothing was sent),
//! transport, unexpected HTTP status, unreadable or malformed bodies, and the
//! OAuth redirect / token exchange failures. An envelope with `result: false`
//! is not an error for resource operations; callers inspect it themselves.

use thiserror::Error;

/// Result type alias for Raindrop.io client operations
pub type Result<T> = std::result::Result<T, RaindropError>;

#[derive(Error, Debug)]
pub enum RaindropError {
    /// A base URL or joined endpoint URL could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The request body could not be encoded as JSON
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A bookmark link is not an absolute http(s) URL
    #[error("Invalid bookmark link '{0}'")]
    InvalidLink(String),

    /// reqwest refused to assemble the request
    #[error("Failed to build request: {0}")]
    Build(#[source] reqwest::Error),

    /// Connection, TLS or timeout failure while talking to the server
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's cancellation token fired before the round trip finished
    #[error("Request was cancelled")]
    Cancelled,

    /// The server answered with a status other than the expected one or 400
    #[error("Unexpected status code: {status}")]
    UnexpectedStatus { status: u16 },

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// The response body is not the expected JSON shape
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The authorization redirect carried an `error` parameter
    #[error("Can't get authorization code: {0}")]
    AuthorizationDenied(String),

    /// The authorization redirect carried neither `code` nor `error`
    #[error("Can't get authorization code: {status}")]
    MissingAuthorizationCode { status: u16 },

    /// The token endpoint answered without an access token
    #[error("Token exchange failed: {message}")]
    TokenExchange { message: String },

    /// The redirect listener failed
    #[error("Redirect server error: {0}")]
    Server(#[from] std::io::Error),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RaindropError {
    /// Status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            RaindropError::UnexpectedStatus { status }
            | RaindropError::MissingAuthorizationCode { status } => Some(*status),
            RaindropError::Transport(e) | RaindropError::Body(e) => {
                e.status().map(|s| s.as_u16())
            }
            _ => None,
        }
    }

    /// True when the error happened before any network I/O
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            RaindropError::InvalidUrl { .. }
                | RaindropError::Encode(_)
                | RaindropError::InvalidLink(_)
                | RaindropError::Build(_)
        )
    }
}
