//! Error types for the scheduler client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the coordinator
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Coordinator returned a non-success status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Coordinator answered with a success code other than the one the endpoint documents
    #[error("Unexpected status {status} (expected {expected})")]
    UnexpectedStatus {
        expected: u16,
        status: u16,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request URL could not be built from the base address and identifiers
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }

    /// Check if the request never produced a response (connect, timeout, URL)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::InvalidUrl(_))
    }

    /// Check if the same request may succeed when sent again
    ///
    /// Only failed requests and 5xx answers qualify. A 4xx will be refused
    /// again, and an unexpected 2xx means the coordinator already applied it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RequestFailed(_)) || self.is_server_error()
    }
}
