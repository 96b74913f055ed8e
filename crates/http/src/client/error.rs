//! Client error types

use counsel_core::sanitize::sanitize_text;
use counsel_core::types::ErrorDetail;
use counsel_core::{CoreError, messages};
use std::fmt;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Error while reading a response body
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// No response was received at all
    #[error("{msg}", msg = messages::NETWORK_FAILURE)]
    Network(#[source] reqwest::Error),

    /// Rejected by the local rate limiter or by the server with 429
    #[error("{msg}", msg = messages::RATE_LIMITED)]
    RateLimited { endpoint: String, local: bool },

    /// Server returned an error status
    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: ErrorBody },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(ErrorBody),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(ErrorBody),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(ErrorBody),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(ErrorBody),

    /// Refresh requested with no refresh token stored
    #[error("{msg}", msg = messages::NO_REFRESH_TOKEN)]
    NoRefreshToken,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisting session state failed
    #[error("Session storage error: {0}")]
    Storage(#[from] CoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Body of a failed response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    /// The backend's `detail` string, only when the body carried one
    pub detail: Option<String>,
    /// Sanitized response text
    pub text: String,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorDetail>(body)
            .ok()
            .map(|error| sanitize_text(&error.detail))
            .filter(|detail| !detail.is_empty());

        Self {
            detail,
            text: sanitize_text(body.trim()),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.detail.as_deref().unwrap_or(&self.text))
    }
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, body: ErrorBody) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(body),
            401 => Self::AuthenticationFailed(body),
            403 => Self::Forbidden(body),
            404 => Self::NotFound(body),
            _ => Self::ServerError {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::RateLimited { local: false, .. } => Some(429),
            Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error means the session is no longer valid
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::NoRefreshToken)
    }

    /// The backend's `detail` message, if the error response carried one
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::BadRequest(body)
            | Self::AuthenticationFailed(body)
            | Self::NotFound(body)
            | Self::Forbidden(body)
            | Self::ServerError { body, .. } => body.detail.as_deref(),
            _ => None,
        }
    }
}
