//! Configuration module
//!
//! Handles CLI configuration: where the coordinator lives and how to
//! authenticate against it.

use anyhow::{Context, Result};
use kala_client::SchedulerClient;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the coordinator
    pub coordinator_url: String,
    /// Bearer token for coordinator calls
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Config {
    /// Builds a scheduler client from this configuration
    pub fn client(&self) -> Result<SchedulerClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let client = SchedulerClient::with_client(self.coordinator_url.clone(), http);
        Ok(match &self.token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }
}
