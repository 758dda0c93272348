//! Error types for the client core.
//!
//! Every fallible operation in the client surfaces a [`ClientError`]. The
//! variants partition failures by what the caller can do about them: retry,
//! re-authenticate, fix input, or give up.

use thiserror::Error;

/// Unified error taxonomy for session, booking and catalog operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Login rejected: bad username/password pair.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An authenticated call came back 401: the credential is no longer
    /// accepted and the session must be torn down.
    #[error("Session expired")]
    SessionExpired,

    /// The credential is valid but lacks the required role (403).
    #[error("Forbidden")]
    Forbidden,

    /// Client-side validation rejected input before any network call.
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// Offending form field.
        field: String,
        /// Human-readable explanation.
        message: String,
    },

    /// The server refused the request as a business-rule violation (409 or
    /// 422), e.g. booking more tickets than remain.
    #[error("Request rejected: {message}")]
    Rejected {
        /// Server-provided explanation.
        message: String,
    },

    /// The referenced resource does not exist (404).
    #[error("Not found")]
    NotFound,

    /// The request never completed: connection refused, DNS failure,
    /// timeout. The operation may succeed on retry.
    #[error("Network error: {message}")]
    Network {
        /// Transport-level description.
        message: String,
    },

    /// The server failed (5xx).
    #[error("Server error (status {status})")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Persisted session data could not be read or written.
    #[error("Credential storage error: {message}")]
    Storage {
        /// Underlying description.
        message: String,
    },
}

impl ClientError {
    /// True for failures that invalidate the current session.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// True for failures where retrying the same request can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Server { .. })
    }

    /// True for failures caused by the user's input rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::Validation { .. } | Self::Rejected { .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}
