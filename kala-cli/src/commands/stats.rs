//! Stats command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use kala_client::SchedulerClient;
use kala_core::domain::stat::JobStat;

/// Stats subcommands
#[derive(Subcommand)]
pub enum StatsCommands {
    /// Show statistics for one execution
    Execution {
        /// Execution ID
        id: String,
    },
    /// Show statistics for every execution of a job
    Job {
        /// Job ID
        id: String,
    },
}

/// Handle stats commands
pub async fn handle_stats_command(command: StatsCommands, client: &SchedulerClient) -> Result<()> {
    match command {
        StatsCommands::Execution { id } => {
            match client
                .get_job_execution_stats(&id, None)
                .await
                .context("Failed to get execution stats")?
            {
                Some(stat) => print_stat(&stat),
                None => println!("{}", format!("Execution {} not found.", id).yellow()),
            }
            Ok(())
        }
        StatsCommands::Job { id } => {
            let stats = client
                .get_all_job_execution_stats(&id, None)
                .await
                .context("Failed to get job stats")?;

            if stats.is_empty() {
                println!("{}", format!("No executions recorded for job {}.", id).yellow());
                return Ok(());
            }

            let succeeded = stats.iter().filter(|s| s.success).count();
            println!(
                "{}",
                format!(
                    "{} execution(s) of job {}, {} succeeded:",
                    stats.len(),
                    id,
                    succeeded
                )
                .bold()
            );
            println!();
            for stat in &stats {
                print_stat(stat);
                println!();
            }
            Ok(())
        }
    }
}

fn print_stat(stat: &JobStat) {
    let outcome = if stat.success {
        "success".green()
    } else {
        "failure".red()
    };

    println!("  {} Execution {}", "▸".cyan(), stat.id.dimmed());
    println!("    Outcome:  {}", outcome);
    if let Some(ran_at) = stat.ran_at {
        println!("    Ran at:   {}", ran_at.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("    Duration: {:.3}s", stat.duration().as_secs_f64());
    println!("    Retries:  {}", stat.number_of_retries);
}
