//! Worker pool
//!
//! Bounded pool that runs execution tasks:
//! - at most `max_workers` tasks run at once (semaphore permits)
//! - at most `queue_capacity` accepted tasks wait for a permit
//! - submission never blocks; overflow is rejected with [`SubmitError::QueueFull`]
//!
//! Shutdown stops intake, still runs every task accepted before it began,
//! waits up to the grace period, then force-cancels what is left and waits
//! once more. Force-cancelled tasks never send their terminal status report;
//! they are counted in [`ShutdownReport::abandoned`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// A unit of work accepted by the pool
pub type PoolTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Reasons a task is refused
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("worker pool is shutting down")]
    ShuttingDown,

    #[error("worker pool queue is full ({0} tasks waiting)")]
    QueueFull(usize),
}

/// Outcome of [`WorkerPool::shutdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// All tasks finished within the first grace period
    pub graceful: bool,
    /// Tasks cancelled (or never started) because the grace period ran out
    pub abandoned: usize,
    /// Tasks still running after the second wait
    pub lingering: usize,
}

/// Bounded worker pool
///
/// Must be created inside a Tokio runtime.
pub struct WorkerPool {
    sender: mpsc::Sender<PoolTask>,
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
    /// Stops intake
    closing: CancellationToken,
    /// Cancels running and queued tasks
    abort: CancellationToken,
    abandoned: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    max_workers: usize,
    queue_capacity: usize,
}

impl WorkerPool {
    /// Creates a pool and starts its feeder
    ///
    /// # Arguments
    /// * `max_workers` - Maximum tasks running at once (at least 1)
    /// * `queue_capacity` - Maximum tasks waiting for a worker (at least 1)
    pub fn new(max_workers: usize, queue_capacity: usize) -> Self {
        let max_workers = max_workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel(queue_capacity);

        let pool = Self {
            sender,
            semaphore: Arc::new(Semaphore::new(max_workers)),
            tracker: TaskTracker::new(),
            closing: CancellationToken::new(),
            abort: CancellationToken::new(),
            abandoned: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicUsize::new(0)),
            max_workers,
            queue_capacity,
        };

        pool.tracker.spawn(Feeder::from(&pool).run(receiver));

        debug!(
            "Worker pool started (workers: {}, queue: {})",
            max_workers, queue_capacity
        );

        pool
    }

    /// Hands a task to the pool without waiting
    pub fn submit(&self, task: impl Future<Output = ()> + Send + 'static) -> Result<(), SubmitError> {
        if self.closing.is_cancelled() {
            return Err(SubmitError::ShuttingDown);
        }

        self.sender
            .try_send(Box::pin(task))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SubmitError::QueueFull(self.queue_capacity),
                mpsc::error::TrySendError::Closed(_) => SubmitError::ShuttingDown,
            })
    }

    /// Tasks currently holding a worker
    pub fn active(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Tasks accepted but not yet handed to a worker
    pub fn queued(&self) -> usize {
        self.queue_capacity - self.sender.capacity()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Whether shutdown has begun
    pub fn is_closing(&self) -> bool {
        self.closing.is_cancelled()
    }

    /// Drains the pool
    ///
    /// New submissions are rejected from the moment this is called. Tasks
    /// already accepted still run. If they have not all finished after
    /// `grace`, the rest are cancelled and the pool waits `grace` once more.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        info!(
            "Shutting down worker pool ({} running, {} queued)",
            self.active(),
            self.queued()
        );

        self.closing.cancel();
        self.tracker.close();

        let graceful = tokio::time::timeout(grace, self.tracker.wait()).await.is_ok();
        let mut lingering = 0;

        if !graceful {
            warn!(
                "Jobs still running after {:?}; cancelling them, their final status will not be reported",
                grace
            );
            self.abort.cancel();

            if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
                lingering = self.active();
                warn!("Scheduled jobs may not have completed ({} still running)", lingering);
            }
        }

        let report = ShutdownReport {
            graceful,
            abandoned: self.abandoned.load(Ordering::SeqCst),
            lingering,
        };

        if report.abandoned > 0 {
            warn!("{} job(s) abandoned during shutdown", report.abandoned);
        } else {
            info!("Worker pool drained");
        }

        report
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.closing.cancel();
        self.abort.cancel();
    }
}

/// Moves tasks from the queue onto workers as permits free up
struct Feeder {
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
    closing: CancellationToken,
    abort: CancellationToken,
    abandoned: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
}

impl From<&WorkerPool> for Feeder {
    fn from(pool: &WorkerPool) -> Self {
        Self {
            semaphore: pool.semaphore.clone(),
            tracker: pool.tracker.clone(),
            closing: pool.closing.clone(),
            abort: pool.abort.clone(),
            abandoned: pool.abandoned.clone(),
            running: pool.running.clone(),
        }
    }
}

impl Feeder {
    async fn run(self, mut receiver: mpsc::Receiver<PoolTask>) {
        // A task only leaves the queue once a worker is free for it
        loop {
            let permit = tokio::select! {
                biased;
                _ = self.closing.cancelled() => break,
                permit = self.semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let task = tokio::select! {
                biased;
                _ = self.closing.cancelled() => break,
                task = receiver.recv() => match task {
                    Some(task) => task,
                    None => break,
                },
            };
            self.spawn(task, permit);
        }

        // Refuse further sends, then run everything accepted before shutdown
        receiver.close();
        let mut drained = 0;
        while let Some(task) = receiver.recv().await {
            drained += 1;
            let permit = tokio::select! {
                biased;
                _ = self.abort.cancelled() => None,
                permit = self.semaphore.clone().acquire_owned() => permit.ok(),
            };
            match permit {
                Some(permit) => self.spawn(task, permit),
                None => {
                    self.abandoned.fetch_add(1, Ordering::SeqCst);
                }
            }
        }
        if drained > 0 {
            debug!("Drained {} queued task(s) during shutdown", drained);
        }
    }

    /// Runs `task` on its own Tokio task, holding `permit` until it ends
    fn spawn(&self, task: PoolTask, permit: OwnedSemaphorePermit) {
        let abort = self.abort.clone();
        let abandoned = self.abandoned.clone();
        let running = RunningGuard::enter(self.running.clone());

        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = abort.cancelled() => {
                    abandoned.fetch_add(1, Ordering::SeqCst);
                }
                _ = task => {}
            }
            drop(running);
            drop(permit);
        });
    }
}

/// Keeps [`WorkerPool::active`] accurate even if a task unwinds
struct RunningGuard(Arc<AtomicUsize>);

impl RunningGuard {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_runs_submitted_tasks() {
        let pool = WorkerPool::new(2, 8);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = counter.clone();
            pool.submit(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        let report = pool.shutdown(Duration::from_secs(5)).await;
        assert!(report.graceful);
        assert_eq!(report.abandoned, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(2, 16);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let running = running.clone();
            let peak = peak.clone();
            pool.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown(Duration::from_secs(5)).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_queue_overflow_is_rejected() {
        let pool = WorkerPool::new(1, 1);
        let release = Arc::new(Notify::new());

        // Occupies the only worker
        let gate = release.clone();
        pool.submit(async move { gate.notified().await }).unwrap();
        tokio::time::timeout(Duration::from_secs(1), async {
            while pool.active() == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        // Fills the queue
        pool.submit(async {}).unwrap();

        assert_eq!(pool.submit(async {}), Err(SubmitError::QueueFull(1)));

        release.notify_one();
        let report = pool.shutdown(Duration::from_secs(5)).await;
        assert!(report.graceful);
    }

    #[tokio::test]
    async fn test_accepted_tasks_survive_shutdown() {
        let pool = WorkerPool::new(1, 32);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter = counter.clone();
            pool.submit(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        let report = pool.shutdown(Duration::from_secs(5)).await;

        assert!(report.graceful);
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_rejected() {
        let pool = WorkerPool::new(2, 4);
        pool.shutdown(Duration::from_secs(1)).await;

        assert!(pool.is_closing());
        assert_eq!(pool.submit(async {}), Err(SubmitError::ShuttingDown));
    }

    #[tokio::test]
    async fn test_stuck_task_is_abandoned_after_grace() {
        let pool = WorkerPool::new(1, 4);
        let finished = Arc::new(AtomicBool::new(false));

        let flag = finished.clone();
        pool.submit(async move {
            std::future::pending::<()>().await;
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();
        // Queued behind the stuck task, never gets a worker
        pool.submit(async {}).unwrap();

        let report = pool.shutdown(Duration::from_millis(50)).await;

        assert!(!report.graceful);
        assert_eq!(report.abandoned, 2);
        assert_eq!(report.lingering, 0);
        assert!(!finished.load(Ordering::SeqCst));
    }
}
