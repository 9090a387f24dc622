//! Kala Agent
//!
//! Serves the trigger API and runs the built-in jobs. Stops accepting
//! triggers on Ctrl+C or SIGTERM, then drains the worker pool.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kala_agent::api;
use kala_agent::config::AgentConfig;
use kala_agent::dispatch::{Dispatcher, RetryPolicy, WorkerPool};
use kala_agent::job::JobRegistry;
use kala_agent::jobs::{HELLO_JOB, HelloJob};
use kala_client::{Scheduler, SchedulerClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kala_agent=info,kala_client=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Kala Agent");

    // Load configuration
    let config = load_config()?;
    info!(
        "Loaded configuration: agent_id={}, coordinator_url={}",
        config.agent_id, config.coordinator_url
    );

    // Initialize coordinator client
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;
    let mut client = SchedulerClient::with_client(config.coordinator_url.clone(), http);
    if let Some(token) = &config.coordinator_token {
        client = client.with_token(token.clone());
    }
    info!(
        "Coordinator client initialized (authenticated: {})",
        client.has_token()
    );
    let scheduler: Arc<dyn Scheduler> = Arc::new(client);

    // Register jobs
    let registry = JobRegistry::builder()
        .register(HELLO_JOB, HelloJob::new(config.hello_requester.clone()))
        .context("Failed to register built-in jobs")?
        .build();

    let pool = WorkerPool::new(config.max_workers, config.queue_capacity);
    let dispatcher = Arc::new(
        Dispatcher::new(registry, scheduler, pool)
            .with_retry_policy(RetryPolicy::new(config.status_retry_attempts)),
    );

    info!("Registered jobs:");
    for name in dispatcher.registry().names() {
        info!("  - {}", name);
    }
    info!(
        "Worker pool: {} worker(s), queue capacity {}",
        dispatcher.pool().max_workers(),
        dispatcher.pool().queue_capacity()
    );

    // Build router
    let app = api::create_router(Arc::clone(&dispatcher));

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Drain in-flight executions
    let report = dispatcher.shutdown(config.shutdown_grace).await;
    if report.graceful {
        info!("Agent stopped cleanly");
    } else {
        warn!(
            "Agent stopped with {} abandoned and {} lingering execution(s)",
            report.abandoned, report.lingering
        );
    }

    Ok(())
}

/// Loads configuration from environment variables with fallback to defaults
fn load_config() -> Result<AgentConfig> {
    match AgentConfig::from_env() {
        Ok(config) => {
            config.validate()?;
            Ok(config)
        }
        Err(_) => {
            info!("Failed to load config from environment, using defaults");
            let config = AgentConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
