//! Scheduler trait
//!
//! The seam between the agent and the coordinator. [`SchedulerClient`] is the
//! HTTP implementation; tests substitute recording fakes.

use async_trait::async_trait;
use kala_core::domain::job::JobDefinition;
use kala_core::domain::stat::JobStat;
use kala_core::domain::status::ExecutionStatus;

use crate::SchedulerClient;
use crate::error::Result;

/// Coordinator control-plane operations
///
/// Every method takes an optional bearer token; `None` is the token-less form.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn add_job(&self, job: &JobDefinition, token: Option<&str>) -> Result<String>;

    async fn get_job(&self, id: &str, token: Option<&str>) -> Result<Option<JobDefinition>>;

    async fn get_job_parameters(&self, id: &str, token: Option<&str>) -> Result<Option<String>>;

    async fn set_job_parameters(&self, id: &str, params: &str, token: Option<&str>) -> Result<()>;

    async fn start_job(&self, id: &str, token: Option<&str>) -> Result<()>;

    async fn enable_job(&self, id: &str, token: Option<&str>) -> Result<()>;

    async fn disable_job(&self, id: &str, token: Option<&str>) -> Result<()>;

    async fn delete_job(&self, id: &str, token: Option<&str>) -> Result<()>;

    async fn delete_all_jobs(&self, token: Option<&str>) -> Result<()>;

    async fn list_jobs(&self, token: Option<&str>) -> Result<Vec<JobDefinition>>;

    async fn get_job_execution_stats(
        &self,
        execution_id: &str,
        token: Option<&str>,
    ) -> Result<Option<JobStat>>;

    async fn get_all_job_execution_stats(
        &self,
        job_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<JobStat>>;

    /// Report the status of one execution
    async fn update_job_execution_status(
        &self,
        job_id: &str,
        execution_id: &str,
        status: ExecutionStatus,
        token: Option<&str>,
    ) -> Result<()>;
}

#[async_trait]
impl Scheduler for SchedulerClient {
    async fn add_job(&self, job: &JobDefinition, token: Option<&str>) -> Result<String> {
        SchedulerClient::add_job(self, job, token).await
    }

    async fn get_job(&self, id: &str, token: Option<&str>) -> Result<Option<JobDefinition>> {
        SchedulerClient::get_job(self, id, token).await
    }

    async fn get_job_parameters(&self, id: &str, token: Option<&str>) -> Result<Option<String>> {
        SchedulerClient::get_job_parameters(self, id, token).await
    }

    async fn set_job_parameters(&self, id: &str, params: &str, token: Option<&str>) -> Result<()> {
        SchedulerClient::set_job_parameters(self, id, params, token).await
    }

    async fn start_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        SchedulerClient::start_job(self, id, token).await
    }

    async fn enable_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        SchedulerClient::enable_job(self, id, token).await
    }

    async fn disable_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        SchedulerClient::disable_job(self, id, token).await
    }

    async fn delete_job(&self, id: &str, token: Option<&str>) -> Result<()> {
        SchedulerClient::delete_job(self, id, token).await
    }

    async fn delete_all_jobs(&self, token: Option<&str>) -> Result<()> {
        SchedulerClient::delete_all_jobs(self, token).await
    }

    async fn list_jobs(&self, token: Option<&str>) -> Result<Vec<JobDefinition>> {
        SchedulerClient::list_jobs(self, token).await
    }

    async fn get_job_execution_stats(
        &self,
        execution_id: &str,
        token: Option<&str>,
    ) -> Result<Option<JobStat>> {
        SchedulerClient::get_job_execution_stats(self, execution_id, token).await
    }

    async fn get_all_job_execution_stats(
        &self,
        job_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<JobStat>> {
        SchedulerClient::get_all_job_execution_stats(self, job_id, token).await
    }

    async fn update_job_execution_status(
        &self,
        job_id: &str,
        execution_id: &str,
        status: ExecutionStatus,
        token: Option<&str>,
    ) -> Result<()> {
        SchedulerClient::update_job_execution_status(self, job_id, execution_id, status, token).await
    }
}
