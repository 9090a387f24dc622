//! Agent configuration
//!
//! Defines all configurable parameters for the agent including the
//! coordinator connection, the trigger listener and the worker pool bounds.

use std::time::Duration;

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Identifier of this agent instance, used in logs
    pub agent_id: String,

    /// Coordinator base URL (e.g., "http://localhost:8000")
    pub coordinator_url: String,

    /// Bearer token sent with every coordinator call
    pub coordinator_token: Option<String>,

    /// Address the trigger listener binds to
    pub bind_addr: String,

    /// Maximum number of jobs executing at once
    pub max_workers: usize,

    /// Maximum number of accepted jobs waiting for a worker
    pub queue_capacity: usize,

    /// How long shutdown waits for in-flight jobs, applied twice
    pub shutdown_grace: Duration,

    /// Attempts for the terminal status report (1 = no retry)
    pub status_retry_attempts: u32,

    /// Timeout for each coordinator request
    pub request_timeout: Duration,

    /// Requester name the built-in Hello job accepts
    pub hello_requester: String,
}

impl AgentConfig {
    /// Creates a new configuration with defaults
    pub fn new(agent_id: String, coordinator_url: String) -> Self {
        Self {
            agent_id,
            coordinator_url,
            coordinator_token: None,
            bind_addr: "0.0.0.0:8080".to_string(),
            max_workers: 16,
            queue_capacity: 256,
            shutdown_grace: Duration::from_secs(15),
            status_retry_attempts: 3,
            request_timeout: Duration::from_secs(30),
            hello_requester: "TestUser1".to_string(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - KALA_COORDINATOR_URL (required)
    /// - KALA_AGENT_ID (optional, default: random UUID)
    /// - KALA_COORDINATOR_TOKEN (optional)
    /// - KALA_AGENT_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - KALA_MAX_WORKERS (optional, default: 16)
    /// - KALA_QUEUE_CAPACITY (optional, default: 256)
    /// - KALA_SHUTDOWN_GRACE (optional, seconds, default: 15)
    /// - KALA_STATUS_RETRY_ATTEMPTS (optional, default: 3)
    /// - KALA_REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - KALA_HELLO_REQUESTER (optional, default: TestUser1)
    pub fn from_env() -> anyhow::Result<Self> {
        let coordinator_url = std::env::var("KALA_COORDINATOR_URL")
            .map_err(|_| anyhow::anyhow!("KALA_COORDINATOR_URL environment variable not set"))?;

        let agent_id = std::env::var("KALA_AGENT_ID")
            .unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

        let mut config = Self::new(agent_id, coordinator_url);

        config.coordinator_token = std::env::var("KALA_COORDINATOR_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        if let Ok(addr) = std::env::var("KALA_AGENT_BIND_ADDR") {
            config.bind_addr = addr;
        }

        config.max_workers = env_parse("KALA_MAX_WORKERS").unwrap_or(config.max_workers);
        config.queue_capacity = env_parse("KALA_QUEUE_CAPACITY").unwrap_or(config.queue_capacity);
        config.status_retry_attempts =
            env_parse("KALA_STATUS_RETRY_ATTEMPTS").unwrap_or(config.status_retry_attempts);

        config.shutdown_grace = env_parse("KALA_SHUTDOWN_GRACE")
            .map(Duration::from_secs)
            .unwrap_or(config.shutdown_grace);

        config.request_timeout = env_parse("KALA_REQUEST_TIMEOUT")
            .map(Duration::from_secs)
            .unwrap_or(config.request_timeout);

        if let Ok(requester) = std::env::var("KALA_HELLO_REQUESTER") {
            config.hello_requester = requester;
        }

        Ok(config)
    }

    /// Sets the coordinator bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.coordinator_token = Some(token.into());
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.agent_id.is_empty() {
            anyhow::bail!("agent_id cannot be empty");
        }

        if self.coordinator_url.is_empty() {
            anyhow::bail!("coordinator_url cannot be empty");
        }

        if !self.coordinator_url.starts_with("http://")
            && !self.coordinator_url.starts_with("https://")
        {
            anyhow::bail!("coordinator_url must start with http:// or https://");
        }

        if self.max_workers == 0 {
            anyhow::bail!("max_workers must be greater than 0");
        }

        if self.queue_capacity == 0 {
            anyhow::bail!("queue_capacity must be greater than 0");
        }

        if self.status_retry_attempts == 0 {
            anyhow::bail!("status_retry_attempts must be at least 1");
        }

        if self.shutdown_grace.is_zero() {
            anyhow::bail!("shutdown_grace must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            "http://localhost:8000".to_string(),
        )
    }
}

/// Parses an optional environment variable, ignoring malformed values
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse::<T>().ok())
}
