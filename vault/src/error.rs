//! Vault error types using thiserror 2.0.
//!
//! Every operation reports failures through [`VaultError`]. Backend
//! rejections keep the HTTP status and response body verbatim; transport
//! failures keep the underlying reqwest error.

use reqwest::StatusCode;
use thiserror::Error;

/// Vault client errors.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Backend answered with a non-success status
    #[error("Vault backend returned {status}: {body}")]
    Backend {
        /// HTTP status returned by Vault
        status: StatusCode,
        /// Response body, unmodified
        body: String,
    },

    /// Request never produced a response (connection, TLS, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Successful response with a body that could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller supplied an unusable identifier
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client configuration cannot be used to build a transport
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for Vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

impl VaultError {
    /// Create a backend error from a status and raw body.
    #[must_use]
    pub fn backend(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Backend {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status reported by the backend, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Check if the error is transient.
    ///
    /// The client never retries on its own; this is a hint for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Transport(_) => true,
            Self::Serialization(_) | Self::InvalidInput(_) | Self::InvalidConfig(_) => false,
        }
    }

    /// Check if the backend reported the target as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
