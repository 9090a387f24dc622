//! Execution context
//!
//! Immutable snapshot of the request-scoped fields (correlation id, job
//! identity, anything the trigger layer adds) captured when a job is
//! dispatched. The snapshot travels with the execution task and is installed
//! as a task-local for the duration of the run, so job code can read it with
//! [`ExecutionContext::current`]. The task-local scope ends with the task on
//! every exit path, which leaves nothing behind for the next task on the same
//! worker thread.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Key of the correlation id field
pub const CORRELATION_ID: &str = "correlation_id";

tokio::task_local! {
    static CURRENT: ExecutionContext;
}

/// Captured request-scoped fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    fields: Arc<BTreeMap<String, String>>,
}

impl ExecutionContext {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` set to `value`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.fields).insert(key.into(), value.into());
        self
    }

    /// Returns a copy with the correlation id set
    pub fn with_correlation_id(self, id: impl Into<String>) -> Self {
        self.with(CORRELATION_ID, id)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.get(CORRELATION_ID)
    }

    /// Fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The context installed for the running task, if any
    pub fn current() -> Option<ExecutionContext> {
        CURRENT.try_with(|context| context.clone()).ok()
    }

    /// Runs `future` with this context installed
    pub async fn scope<F: Future>(self, future: F) -> F::Output {
        CURRENT.scope(self, future).await
    }

    /// Runs the synchronous `f` with this context installed
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_does_not_touch_snapshot() {
        let base = ExecutionContext::new().with_correlation_id("c-1");
        let extended = base.clone().with("tenant", "acme");

        assert_eq!(base.get("tenant"), None);
        assert_eq!(extended.get("tenant"), Some("acme"));
        assert_eq!(extended.correlation_id(), Some("c-1"));
    }

    #[test]
    fn test_iter_is_ordered() {
        let context = ExecutionContext::new().with("b", "2").with("a", "1");
        let fields: Vec<_> = context.iter().collect();
        assert_eq!(fields, vec![("a", "1"), ("b", "2")]);
    }

    #[tokio::test]
    async fn test_scope_installs_and_clears() {
        assert!(ExecutionContext::current().is_none());

        let context = ExecutionContext::new().with_correlation_id("c-2");
        let seen = context
            .clone()
            .scope(async { ExecutionContext::current() })
            .await;

        assert_eq!(seen, Some(context));
        assert!(ExecutionContext::current().is_none());
    }

    #[tokio::test]
    async fn test_scope_clears_after_panic() {
        let context = ExecutionContext::new().with_correlation_id("c-3");
        let handle = tokio::spawn(context.scope(async {
            let outcome: Option<i32> = None;
            outcome.expect("job blew up")
        }));

        assert!(handle.await.unwrap_err().is_panic());
        assert!(ExecutionContext::current().is_none());
    }
}
