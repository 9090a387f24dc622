//! Kala Agent
//!
//! Execution agent for the Kala job scheduler. The coordinator owns job
//! definitions and timing; when a job is due it calls the agent's trigger
//! endpoint, and the agent runs the matching local job on a bounded worker
//! pool, reporting `Running` and then `Success` or `Failed` back to the
//! coordinator.
//!
//! Architecture:
//! - [`job`]: the [`ScheduledJob`](job::ScheduledJob) contract and the immutable registry
//! - [`dispatch`]: dispatcher, worker pool and per-execution tasks
//! - [`context`]: request-scoped fields carried into each execution
//! - [`api`]: axum router for triggers, validation and health
//! - [`config`]: environment-driven settings

pub mod api;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod job;
pub mod jobs;

#[cfg(test)]
mod test_support;
