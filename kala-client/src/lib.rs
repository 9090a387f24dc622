//! Kala Scheduler Client
//!
//! A typed HTTP client for the coordinator's control-plane API, used by the
//! execution agent to report run status and by the `kala` CLI to manage job
//! definitions.
//!
//! Every operation takes an optional bearer token. `Some` overrides the
//! client-wide token for that call. `None` means "use the client-wide token
//! if one is set" ([`SchedulerClient::with_token`]), not "send no token". To
//! send a request with no `Authorization` header from a client that carries a
//! token, call through [`SchedulerClient::without_token`].
//!
//! Failures are returned as [`ClientError`] values and are also logged at the
//! call site, so callers that choose to ignore a result still leave a trace.
//!
//! # Example
//!
//! ```no_run
//! use kala_client::SchedulerClient;
//! use kala_core::domain::status::ExecutionStatus;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SchedulerClient::new("http://localhost:8000");
//!
//!     client
//!         .update_job_execution_status("job-1", "run-1", ExecutionStatus::Running, None)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod executions;
mod jobs;
mod scheduler;

#[cfg(test)]
mod test_server;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use scheduler::Scheduler;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Versioned path of the coordinator's job API
const API_JOB_PATH: &str = "api/v1/job/";

/// HTTP client for the coordinator API
///
/// Cheap to clone; clones share the underlying connection pool, which is safe
/// for concurrent use from many execution tasks.
#[derive(Debug, Clone)]
pub struct SchedulerClient {
    /// Base URL of the coordinator (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Bearer token used when a call does not pass its own
    token: Option<String>,
}

impl SchedulerClient {
    /// Create a new scheduler client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the coordinator (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use kala_client::SchedulerClient;
    ///
    /// let client = SchedulerClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new scheduler client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use kala_client::SchedulerClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = SchedulerClient::with_client("http://localhost:8000", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        }
    }

    /// Set the bearer token sent when a call passes `None`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// A copy of this client that sends no client-wide token
    ///
    /// Shares the connection pool. Calls passing `None` through the copy go
    /// out unauthenticated.
    pub fn without_token(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }

    /// Whether a client-wide token is configured
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Get the base URL of the coordinator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Request Building
    // =============================================================================

    /// Build a job API URL from path segments
    ///
    /// Each segment is percent-encoded as a single path segment, so identifiers
    /// containing `/`, `?`, `#` or spaces cannot escape their position.
    fn job_url(&self, segments: &[&str], trailing_slash: bool) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, API_JOB_PATH);
        let mut url = Url::parse(&raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(format!("{} cannot carry a path", raw)))?;
            path.pop_if_empty();
            path.extend(segments);
            if trailing_slash {
                path.push("");
            }
        }

        Ok(url)
    }

    /// Attach the per-call token, else the client-wide one, else nothing
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token.or(self.token.as_deref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the response against the endpoint's documented status
    ///
    /// Non-success codes become [`ClientError::ApiError`]; a success code other
    /// than `expected` becomes [`ClientError::UnexpectedStatus`].
    async fn expect_status(
        &self,
        response: reqwest::Response,
        expected: StatusCode,
    ) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        if status != expected {
            return Err(ClientError::UnexpectedStatus {
                expected: expected.as_u16(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Handle a 200 response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.expect_status(response, StatusCode::OK).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle a 200 response whose 404 means "absent"
    async fn handle_optional_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<Option<T>> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.handle_response(response).await.map(Some)
    }

    /// Handle a response that carries no body
    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
        expected: StatusCode,
    ) -> Result<()> {
        self.expect_status(response, expected).await?;
        Ok(())
    }
}
