//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod stats;
mod status;

pub use job::JobCommands;
pub use stats::StatsCommands;

use anyhow::Result;
use clap::Subcommand;
use kala_core::domain::status::ExecutionStatus;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job definition management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Execution statistics
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },
    /// Report an execution status by hand
    Status {
        /// Job ID
        job_id: String,
        /// Execution ID
        execution_id: String,
        /// Started, Running, Failed or Success
        status: ExecutionStatus,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        Commands::Job { command } => job::handle_job_command(command, &client).await,
        Commands::Stats { command } => stats::handle_stats_command(command, &client).await,
        Commands::Status {
            job_id,
            execution_id,
            status,
        } => status::report_status(&client, &job_id, &execution_id, status).await,
    }
}
