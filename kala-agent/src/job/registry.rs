//! Job registry
//!
//! Immutable mapping from job name to implementation. Built once at startup
//! and handed to the dispatcher; lookups need no locking.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::{Blocking, BlockingJob, ScheduledJob};

/// Errors raised while building a registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("job name cannot be empty")]
    EmptyName,

    #[error("job '{0}' is already registered")]
    DuplicateName(String),
}

/// Read-only job registry
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<HashMap<String, Arc<dyn ScheduledJob>>>,
}

impl JobRegistry {
    /// Starts building a registry
    pub fn builder() -> JobRegistryBuilder {
        JobRegistryBuilder::default()
    }

    /// Looks up a job by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ScheduledJob>> {
        self.jobs.get(name).cloned()
    }

    /// Checks whether a job is registered
    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Registered job names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.jobs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl std::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("jobs", &self.names())
            .finish()
    }
}

/// Builder for [`JobRegistry`]
#[derive(Default)]
pub struct JobRegistryBuilder {
    jobs: HashMap<String, Arc<dyn ScheduledJob>>,
}

impl JobRegistryBuilder {
    /// Registers a job under `name`
    pub fn register(
        self,
        name: impl Into<String>,
        job: impl ScheduledJob + 'static,
    ) -> Result<Self, RegistryError> {
        self.register_shared(name, Arc::new(job))
    }

    /// Registers a synchronous job under `name`; its runs go to the blocking pool
    pub fn register_blocking(
        self,
        name: impl Into<String>,
        job: impl BlockingJob,
    ) -> Result<Self, RegistryError> {
        self.register(name, Blocking::new(job))
    }

    /// Registers an already shared job under `name`
    pub fn register_shared(
        mut self,
        name: impl Into<String>,
        job: Arc<dyn ScheduledJob>,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.jobs.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        self.jobs.insert(name, job);
        Ok(self)
    }

    /// Freezes the registry
    pub fn build(self) -> JobRegistry {
        JobRegistry {
            jobs: Arc::new(self.jobs),
        }
    }
}
