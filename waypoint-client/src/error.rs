//! Client error types

use thiserror::Error;

/// Errors returned by the Waypoint API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// No token was configured
    #[error("no Waypoint token set")]
    MissingToken,

    /// The server address could not be parsed
    #[error("invalid Waypoint server address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Transport-level failure
    #[error("request to Waypoint server failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The requested object does not exist
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// The server answered with an error status
    #[error("Waypoint API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not what the API documents
    #[error("failed to decode Waypoint response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
