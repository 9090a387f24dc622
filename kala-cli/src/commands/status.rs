//! Status command handler

use anyhow::{Context, Result};
use colored::*;
use kala_client::SchedulerClient;
use kala_core::domain::status::ExecutionStatus;

/// Push an execution status to the coordinator
pub async fn report_status(
    client: &SchedulerClient,
    job_id: &str,
    execution_id: &str,
    status: ExecutionStatus,
) -> Result<()> {
    client
        .update_job_execution_status(job_id, execution_id, status, None)
        .await
        .with_context(|| format!("Failed to report {} for execution {}", status, execution_id))?;

    println!(
        "{} Execution {} of job {} marked {}",
        "✓".green(),
        execution_id.cyan(),
        job_id.dimmed(),
        super::job::colorize_status(status)
    );

    Ok(())
}
