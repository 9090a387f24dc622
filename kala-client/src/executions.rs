//! Job execution endpoints
//!
//! Statistics retrieval and status updates for individual runs.

use crate::SchedulerClient;
use crate::error::Result;
use kala_core::domain::stat::JobStat;
use kala_core::domain::status::ExecutionStatus;
use reqwest::StatusCode;
use tracing::{error, trace};

impl SchedulerClient {
    /// Get the statistics of one execution
    ///
    /// # Returns
    /// `None` when the coordinator has no record of the execution
    pub async fn get_job_execution_stats(
        &self,
        execution_id: &str,
        token: Option<&str>,
    ) -> Result<Option<JobStat>> {
        trace!("get_job_execution_stats {}", execution_id);
        let result: Result<Option<JobStat>> = async {
            let url = self.job_url(&["executions", execution_id], true)?;
            let response = self.authorize(self.client.get(url), token).send().await?;
            self.handle_optional_response(response).await
        }
        .await;

        result.inspect_err(|e| {
            error!(
                "Unable to retrieve statistics for execution {}: {}",
                execution_id, e
            )
        })
    }

    /// Get the statistics of every execution of a job
    pub async fn get_all_job_execution_stats(
        &self,
        job_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<JobStat>> {
        trace!("get_all_job_execution_stats {}", job_id);
        let result: Result<Vec<JobStat>> = async {
            let url = self.job_url(&[job_id, "executions"], true)?;
            let response = self.authorize(self.client.get(url), token).send().await?;
            self.handle_response(response).await
        }
        .await;

        result.inspect_err(|e| error!("Unable to retrieve statistics for job {}: {}", job_id, e))
    }

    /// Report the status of one execution
    ///
    /// The body is the status's wire string as JSON (e.g. `"Running"`); the
    /// coordinator answers 204.
    pub async fn update_job_execution_status(
        &self,
        job_id: &str,
        execution_id: &str,
        status: ExecutionStatus,
        token: Option<&str>,
    ) -> Result<()> {
        trace!(
            "update_job_execution_status {} {} {}",
            job_id, execution_id, status
        );
        let result: Result<()> = async {
            let url = self.job_url(&[job_id, "executions", execution_id], true)?;
            let request = self.client.put(url).json(&status);
            let response = self.authorize(request, token).send().await?;
            self.handle_empty_response(response, StatusCode::NO_CONTENT).await
        }
        .await;

        result.inspect_err(|e| {
            error!(
                "Unable to update execution {} of job {} to {}: {}",
                execution_id, job_id, status, e
            )
        })
    }
}
