//! Job command handlers
//!
//! Handles job definition management: listing, viewing, creating, running,
//! enabling, disabling and deleting jobs, plus their parameter strings.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use kala_client::SchedulerClient;
use kala_core::domain::job::{JobDefinition, JobType, RemoteProperties};
use kala_core::domain::status::ExecutionStatus;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List all jobs
    List,
    /// Get job details
    Get {
        /// Job ID
        id: String,
    },
    /// Create a job
    Add {
        /// JSON file holding a full job definition
        #[arg(short, long, conflicts_with_all = ["name", "command", "url"])]
        file: Option<String>,

        /// Job name
        #[arg(short, long)]
        name: Option<String>,

        /// Command for a local job
        #[arg(short, long)]
        command: Option<String>,

        /// URL for a remote job
        #[arg(long, conflicts_with = "command")]
        url: Option<String>,

        /// HTTP method for a remote job
        #[arg(long, default_value = "GET")]
        method: String,

        /// ISO 8601 repeating interval (e.g. R/2024-01-01T00:00:00Z/PT1H)
        #[arg(short, long)]
        schedule: Option<String>,

        /// Owner of the job
        #[arg(short, long)]
        owner: Option<String>,

        /// Retries on failure
        #[arg(long, default_value = "0")]
        retries: u32,
    },
    /// Run a job now
    Start {
        /// Job ID
        id: String,
    },
    /// Enable a job
    Enable {
        /// Job ID
        id: String,
    },
    /// Disable a job
    Disable {
        /// Job ID
        id: String,
    },
    /// Delete a job
    Delete {
        /// Job ID
        id: String,
    },
    /// Delete every job
    DeleteAll {
        /// Skip confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Show a job's parameter string
    Params {
        /// Job ID
        id: String,
    },
    /// Replace a job's parameter string
    SetParams {
        /// Job ID
        id: String,
        /// New parameter string
        params: String,
    },
}

/// Handle job commands
pub async fn handle_job_command(command: JobCommands, client: &SchedulerClient) -> Result<()> {
    match command {
        JobCommands::List => list_jobs(client).await,
        JobCommands::Get { id } => get_job(client, &id).await,
        JobCommands::Add {
            file,
            name,
            command,
            url,
            method,
            schedule,
            owner,
            retries,
        } => {
            let job = match file {
                Some(path) => read_definition(&path)?,
                None => build_definition(name, command, url, method, schedule, owner, retries)?,
            };
            add_job(client, &job).await
        }
        JobCommands::Start { id } => {
            client
                .start_job(&id, None)
                .await
                .context("Failed to start job")?;
            println!("{} Job {} started", "✓".green(), id.cyan());
            Ok(())
        }
        JobCommands::Enable { id } => {
            client
                .enable_job(&id, None)
                .await
                .context("Failed to enable job")?;
            println!("{} Job {} enabled", "✓".green(), id.cyan());
            Ok(())
        }
        JobCommands::Disable { id } => {
            client
                .disable_job(&id, None)
                .await
                .context("Failed to disable job")?;
            println!("{} Job {} disabled", "✓".green(), id.cyan());
            Ok(())
        }
        JobCommands::Delete { id } => {
            client
                .delete_job(&id, None)
                .await
                .context("Failed to delete job")?;
            println!("{} Job {} deleted", "✓".green(), id.cyan());
            Ok(())
        }
        JobCommands::DeleteAll { yes } => delete_all_jobs(client, yes).await,
        JobCommands::Params { id } => get_params(client, &id).await,
        JobCommands::SetParams { id, params } => {
            client
                .set_job_parameters(&id, &params, None)
                .await
                .context("Failed to update job parameters")?;
            println!("{} Parameters updated for job {}", "✓".green(), id.cyan());
            Ok(())
        }
    }
}

/// List all jobs
async fn list_jobs(client: &SchedulerClient) -> Result<()> {
    let jobs = client
        .list_jobs(None)
        .await
        .context("Failed to list jobs")?;

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs {
            print_job_summary(&job);
        }
    }

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &SchedulerClient, id: &str) -> Result<()> {
    match client.get_job(id, None).await.context("Failed to get job")? {
        Some(job) => print_job_details(&job),
        None => println!("{}", format!("Job {} not found.", id).yellow()),
    }

    Ok(())
}

/// Create a job and print its id
async fn add_job(client: &SchedulerClient, job: &JobDefinition) -> Result<()> {
    let id = client
        .add_job(job, None)
        .await
        .context("Failed to create job")?;

    println!("{}", "✓ Job created successfully!".green().bold());
    println!("  ID:   {}", id.cyan());
    println!("  Name: {}", job.name);

    Ok(())
}

async fn delete_all_jobs(client: &SchedulerClient, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete every job without --yes");
    }

    client
        .delete_all_jobs(None)
        .await
        .context("Failed to delete jobs")?;
    println!("{}", "✓ All jobs deleted".green());

    Ok(())
}

async fn get_params(client: &SchedulerClient, id: &str) -> Result<()> {
    match client
        .get_job_parameters(id, None)
        .await
        .context("Failed to get job parameters")?
    {
        Some(params) if params.is_empty() => println!("{}", "(empty)".dimmed()),
        Some(params) => println!("{}", params),
        None => println!("{}", format!("Job {} not found.", id).yellow()),
    }

    Ok(())
}

fn read_definition(path: &str) -> Result<JobDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job definition: {}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse job definition: {}", path))
}

/// Builds a definition from command-line flags
fn build_definition(
    name: Option<String>,
    command: Option<String>,
    url: Option<String>,
    method: String,
    schedule: Option<String>,
    owner: Option<String>,
    retries: u32,
) -> Result<JobDefinition> {
    let Some(name) = name else {
        bail!("--name is required unless --file is given");
    };

    let mut job = match (command, url) {
        (Some(command), None) => JobDefinition::local(name, command),
        (None, Some(url)) => JobDefinition::remote(
            name,
            RemoteProperties {
                url,
                method,
                ..Default::default()
            },
        ),
        _ => bail!("Either --command or --url is required"),
    };

    if let Some(schedule) = schedule {
        job = job.with_schedule(schedule);
    }
    job.owner = owner;
    job.retries = retries;

    Ok(job)
}

/// Print a one-job summary
fn print_job_summary(job: &JobDefinition) {
    let state = if job.disabled {
        "disabled".yellow()
    } else {
        "enabled".green()
    };

    println!(
        "  {} {} {}",
        "▸".cyan(),
        job.name.bold(),
        job.id.as_deref().unwrap_or("-").dimmed()
    );
    println!("    Type:     {}", job.job_type);
    println!("    State:    {}", state);
    if let Some(schedule) = &job.schedule {
        println!("    Schedule: {}", schedule.dimmed());
    }
    if let Some(next) = job.next_run_at {
        println!(
            "    Next run: {}",
            next.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }
    println!();
}

/// Print detailed job information
fn print_job_details(job: &JobDefinition) {
    println!("{}", "Job Details:".bold());
    println!("  Name:     {}", job.name.cyan());
    println!("  ID:       {}", job.id.as_deref().unwrap_or("-"));
    println!("  Type:     {}", job.job_type);
    println!("  Disabled: {}", job.disabled);
    println!("  Retries:  {}", job.retries);

    if let Some(owner) = &job.owner {
        println!("  Owner:    {}", owner);
    }
    if let Some(schedule) = &job.schedule {
        println!("  Schedule: {}", schedule);
    }
    if let Some(next) = job.next_run_at {
        println!("  Next run: {}", next.format("%Y-%m-%d %H:%M:%S"));
    }

    match job.job_type {
        JobType::Local => {
            if let Some(command) = &job.command {
                println!("  Command:  {}", command);
            }
        }
        JobType::Remote => {
            if let Some(remote) = &job.remote_properties {
                println!("  Request:  {} {}", remote.method, remote.url);
            }
        }
    }

    if let Some(metadata) = &job.metadata {
        println!("\n{}", "Metadata:".bold());
        println!("  Successes: {}", metadata.success_count.to_string().green());
        println!("  Errors:    {}", metadata.error_count.to_string().red());
        println!("  Finished:  {}", metadata.number_of_finished_runs);
        if let Some(last) = metadata.last_success {
            println!("  Last success: {}", last.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(last) = metadata.last_error {
            println!("  Last error:   {}", last.format("%Y-%m-%d %H:%M:%S"));
        }
    }

    if !job.dependent_jobs.is_empty() {
        println!("\n{}", "Dependent jobs:".bold());
        for dependent in &job.dependent_jobs {
            println!("  - {}", dependent);
        }
    }
}

/// Colorize execution status for display
pub fn colorize_status(status: ExecutionStatus) -> ColoredString {
    match status {
        ExecutionStatus::Started => status.as_str().yellow(),
        ExecutionStatus::Running => status.as_str().blue(),
        ExecutionStatus::Failed => status.as_str().red(),
        ExecutionStatus::Success => status.as_str().green(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_local_definition() {
        let job = build_definition(
            Some("backup".to_string()),
            Some("bash /opt/backup.sh".to_string()),
            None,
            "GET".to_string(),
            Some("R/2024-01-01T00:00:00Z/PT1H".to_string()),
            Some("ops@example.com".to_string()),
            2,
        )
        .unwrap();

        assert_eq!(job.job_type, JobType::Local);
        assert_eq!(job.command.as_deref(), Some("bash /opt/backup.sh"));
        assert_eq!(job.schedule.as_deref(), Some("R/2024-01-01T00:00:00Z/PT1H"));
        assert_eq!(job.retries, 2);
    }

    #[test]
    fn test_build_remote_definition() {
        let job = build_definition(
            Some("ping".to_string()),
            None,
            Some("https://example.com/ping".to_string()),
            "POST".to_string(),
            None,
            None,
            0,
        )
        .unwrap();

        assert_eq!(job.job_type, JobType::Remote);
        let remote = job.remote_properties.unwrap();
        assert_eq!(remote.url, "https://example.com/ping");
        assert_eq!(remote.method, "POST");
    }

    #[test]
    fn test_build_definition_requires_target() {
        let result = build_definition(
            Some("nothing".to_string()),
            None,
            None,
            "GET".to_string(),
            None,
            None,
            0,
        );
        assert!(result.is_err());

        let result = build_definition(None, Some("true".to_string()), None, "GET".to_string(), None, None, 0);
        assert!(result.is_err());
    }
}
