//! Kala CLI
//!
//! Command-line interface for managing jobs on the Kala coordinator.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kala")]
#[command(about = "Kala job scheduler CLI", long_about = None)]
struct Cli {
    /// Coordinator URL
    #[arg(
        long,
        env = "KALA_COORDINATOR_URL",
        default_value = "http://localhost:8000"
    )]
    coordinator_url: String,

    /// Bearer token for the coordinator
    #[arg(long, env = "KALA_COORDINATOR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Client errors are already reported by the commands; keep library logs quiet
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kala_client=off".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        coordinator_url: cli.coordinator_url,
        token: cli.token.filter(|token| !token.is_empty()),
        timeout: Duration::from_secs(cli.timeout),
    };

    handle_command(cli.command, &config).await
}
