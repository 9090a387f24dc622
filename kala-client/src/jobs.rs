//! Job definition endpoints

use crate::SchedulerClient;
use crate::error::Result;
use kala_core::domain::job::JobDefinition;
use kala_core::dto::job::AddJobResponse;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tracing::{error, trace};

impl SchedulerClient {
    // =============================================================================
    // Job Definitions
    // =============================================================================

    /// Add a new job definition
    ///
    /// # Returns
    /// The id the coordinator assigned to the job
    pub async fn add_job(&self, job: &JobDefinition, token: Option<&str>) -> Result<String> {
        trace!("add_job {}", job.name);
        let result: Result<String> = async {
            let url = self.job_url(&[], true)?;
            let request = self.client.post(url).json(job);
            let response = self.authorize(request, token).send().await?;
            let body: AddJobResponse = self.handle_response(response).await?;
            Ok(body.id)
        }
        .await;

        result.inspect_err(|e| error!("Unable to add job definition {}: {}", job.name, e))
    }

    /// Get a job definition by id
    ///
    /// # Returns
    /// `None` when the coordinator does not know the job
    pub async fn get_job(&self, id: &str, token: Option<&str>) -> Result<Option<JobDefinition>> {
        trace!("get_job {}", id);
        let result: Result<Option<JobDefinition>> = async {
            let url = self.job_url(&[id], true)?;
            let response = self.authorize(self.client.get(url), token).send().await?;
            self.handle_optional_response(response).await
        }
        .await;

        result.inspect_err(|e| error!("Unable to get job {}: {}", id, e))
    }

    /// List all job definitions
    pub async fn list_jobs(&self, token: Option<&str>) -> Result<Vec<JobDefinition>> {
        trace!("list_jobs");
        let result: Result<Vec<JobDefinition>> = async {
            let url = self.job_url(&[], true)?;
            let response = self.authorize(self.client.get(url), token).send().await?;
            self.handle_response(response).await
        }
        .await;

        result.inspect_err(|e| error!("Unable to list jobs: {}", e))
    }

    /// Delete a job definition
    pub async fn delete_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        trace!("delete_job {}", id);
        let result: Result<()> = async {
            let url = self.job_url(&[id], false)?;
            let response = self.authorize(self.client.delete(url), token).send().await?;
            self.handle_empty_response(response, StatusCode::OK).await
        }
        .await;

        result.inspect_err(|e| error!("Unable to delete job {}: {}", id, e))
    }

    /// Delete every job definition
    pub async fn delete_all_jobs(&self, token: Option<&str>) -> Result<()> {
        trace!("delete_all_jobs");
        let result: Result<()> = async {
            let url = self.job_url(&["all"], true)?;
            let response = self.authorize(self.client.delete(url), token).send().await?;
            self.handle_empty_response(response, StatusCode::OK).await
        }
        .await;

        result.inspect_err(|e| error!("Unable to delete all jobs: {}", e))
    }

    // =============================================================================
    // Job Actions
    // =============================================================================

    /// Run a job now, outside its schedule
    pub async fn start_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        self.job_action("start", id, token)
            .await
            .inspect_err(|e| error!("Unable to start job {}: {}", id, e))
    }

    /// Enable a disabled job
    pub async fn enable_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        self.job_action("enable", id, token)
            .await
            .inspect_err(|e| error!("Unable to enable job {}: {}", id, e))
    }

    /// Disable a job so its schedule no longer fires
    pub async fn disable_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        self.job_action("disable", id, token)
            .await
            .inspect_err(|e| error!("Unable to disable job {}: {}", id, e))
    }

    /// POST `{action}/{id}/`, expecting 200
    async fn job_action(&self, action: &str, id: &str, token: Option<&str>) -> Result<()> {
        trace!("{}_job {}", action, id);
        let url = self.job_url(&[action, id], true)?;
        let response = self.authorize(self.client.post(url), token).send().await?;
        self.handle_empty_response(response, StatusCode::OK).await
    }

    // =============================================================================
    // Job Parameters
    // =============================================================================

    /// Get a job's parameter string (normally JSON)
    ///
    /// # Returns
    /// `None` when the coordinator does not know the job
    pub async fn get_job_parameters(&self, id: &str, token: Option<&str>) -> Result<Option<String>> {
        trace!("get_job_parameters {}", id);
        let result: Result<Option<String>> = async {
            let url = self.job_url(&[id, "params"], true)?;
            let response = self.authorize(self.client.get(url), token).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            let response = self.expect_status(response, StatusCode::OK).await?;
            Ok(Some(response.text().await?))
        }
        .await;

        result.inspect_err(|e| error!("Unable to get parameters for job {}: {}", id, e))
    }

    /// Replace a job's parameter string
    ///
    /// The string is sent as-is; the client never parses it.
    pub async fn set_job_parameters(&self, id: &str, params: &str, token: Option<&str>) -> Result<()> {
        trace!("set_job_parameters {}", id);
        let result: Result<()> = async {
            let url = self.job_url(&[id, "params"], true)?;
            let request = self
                .client
                .put(url)
                .header(CONTENT_TYPE, "application/json")
                .body(params.to_string());
            let response = self.authorize(request, token).send().await?;
            self.handle_empty_response(response, StatusCode::NO_CONTENT).await
        }
        .await;

        result.inspect_err(|e| error!("Unable to update parameters for job {}: {}", id, e))
    }
}
