//! Redfish client errors

use thiserror::Error;

/// Errors that can occur when interacting with a Redfish service
#[derive(Debug, Error)]
pub enum RedfishError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The BMC answered with a non-success status
    #[error("Redfish API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the BMC
        status: u16,
        /// Response body or decode failure detail
        message: String,
    },

    /// Authentication failed (bad credentials, session expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., a path segment the BMC cannot address)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The execution context was cancelled before the call completed
    #[error("operation cancelled")]
    Cancelled,
}

impl RedfishError {
    /// Whether the failure is likely to go away on its own.
    ///
    /// Connection-level failures and 5xx answers are transient. Auth, 4xx,
    /// decode errors and cancellation are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            RedfishError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            RedfishError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
