//! API error taxonomy
//!
//! Classifies everything a domain operation can fail with. Only the
//! 401 path is ever handled internally (once, by the pipeline); every
//! other kind propagates to the caller unchanged.

use std::time::Duration;

use thiserror::Error;

use crate::auth::RenewalError;
use crate::http::TransportError;

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure; never triggers renewal
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The fixed deadline elapsed; treated as a transport failure and
    /// never routed through the renewal path
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Terminal 401: the single permitted retry was already spent, or
    /// credentials were rejected outright (bad login)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Credential renewal failed; the session was cleared and the
    /// caller must re-authenticate
    #[error("Credential renewal failed: {0}")]
    Renewal(#[from] RenewalError),

    /// The backend rejected the request payload (400)
    #[error("Validation rejected: {0}")]
    Validation(String),

    /// The requested resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other client error (4xx)
    #[error("Client error: {0}")]
    Client(String),

    /// Server error (5xx), propagated unchanged
    #[error("Server error: {0}")]
    Server(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Client-side configuration problem
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether the caller must re-authenticate before retrying anything
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Renewal(_))
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(timeout) => Self::Timeout(timeout),
            TransportError::Connect(message) | TransportError::Other(message) => {
                Self::Transport(message)
            }
        }
    }
}
