//! Bounded background task executor.
//!
//! Admission on [`TaskExecutor::submit`] tries, in order: a free core worker,
//! a slot in the wait queue, an overflow worker, and finally the submitting
//! task itself. Workers take queued tasks in arrival order once their current
//! task finishes. Task errors and panics are logged with the task name and
//! trace identifier and never reach the submitter.
//!
//! [`TaskExecutor::shutdown`] stops admission, waits for running and queued
//! tasks up to the grace period, then aborts whatever is left.

use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use color_eyre::eyre::Report;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::field::display;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::ExecutorSettings;
use crate::domain::RequestContext;

/// Errors raised when submitting work or building the executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The executor no longer accepts tasks.
    #[error("task executor is shut down")]
    ShutDown,
    /// No Tokio runtime was available to host worker tasks.
    #[error("task executor requires a running Tokio runtime")]
    NoRuntime,
    /// Task bookkeeping was poisoned by a panicking thread.
    #[error("task executor state poisoned")]
    StatePoisoned,
}

/// How a submitted task was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Admission {
    /// Started immediately on a core worker.
    Spawned,
    /// Waiting in the queue for the next idle worker.
    Queued,
    /// Started on an overflow worker.
    Overflow,
    /// Ran to completion on the submitting task.
    CallerRan,
}

/// Accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    task_name: String,
    admission: Admission,
}

impl Submission {
    fn new(task_name: String, admission: Admission) -> Self {
        Self {
            task_name,
            admission,
        }
    }

    /// Name the task logs under.
    #[must_use]
    pub fn task_name(&self) -> &str {
        self.task_name.as_str()
    }

    #[must_use]
    pub fn admission(&self) -> Admission {
        self.admission
    }
}

/// Result of [`TaskExecutor::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every running and queued task finished within the grace period.
    Drained,
    /// The grace period elapsed; `aborted` tasks were cancelled.
    TimedOut { aborted: usize },
}

type Job = BoxFuture<'static, ()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Worker {
    Core,
    Overflow,
}

/// Worker and queue bookkeeping. Every admission decision and every worker
/// retirement happens under one lock, so a queued job is never stranded.
struct Pool {
    busy_core: usize,
    busy_overflow: usize,
    queue: VecDeque<Job>,
    tasks: JoinSet<()>,
    shutting_down: bool,
}

struct Inner {
    handle: Handle,
    settings: ExecutorSettings,
    core_workers: usize,
    overflow_workers: usize,
    pool: Mutex<Pool>,
    sequence: AtomicU64,
}

impl Inner {
    fn pool(&self) -> MutexGuard<'_, Pool> {
        match self.pool.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Next queued job for a worker that just went idle; retires the worker
    /// when the queue is empty.
    fn next_job(&self, worker: Worker) -> Option<Job> {
        let mut pool = self.pool();
        let job = pool.queue.pop_front();
        if job.is_none() {
            match worker {
                Worker::Core => pool.busy_core = pool.busy_core.saturating_sub(1),
                Worker::Overflow => pool.busy_overflow = pool.busy_overflow.saturating_sub(1),
            }
        }
        job
    }
}

async fn work(inner: Arc<Inner>, worker: Worker, first: Job) {
    let mut next = Some(first);
    while let Some(job) = next {
        job.await;
        next = inner.next_job(worker);
    }
}

/// Cloneable handle to a shared bounded worker pool.
///
/// # Examples
/// ```
/// use scaffold::config::ExecutorSettings;
/// use scaffold::executor::{Admission, ShutdownOutcome, TaskExecutor};
/// use scaffold::RequestContext;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), scaffold::executor::ExecutorError> {
/// let executor = TaskExecutor::new(ExecutorSettings::default())?;
/// let submission = executor
///     .submit(&RequestContext::detached(), async { Ok(()) })
///     .await?;
/// assert_eq!(submission.admission(), Admission::Spawned);
/// assert_eq!(executor.shutdown().await, ShutdownOutcome::Drained);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TaskExecutor {
    inner: Arc<Inner>,
}

impl TaskExecutor {
    /// Build an executor hosted on the current Tokio runtime.
    ///
    /// # Errors
    /// Returns [`ExecutorError::NoRuntime`] outside a Tokio runtime.
    pub fn new(settings: ExecutorSettings) -> Result<Self, ExecutorError> {
        let handle = Handle::try_current().map_err(|_| ExecutorError::NoRuntime)?;
        Ok(Self::with_handle(settings, handle))
    }

    /// Build an executor whose workers run on `handle`.
    #[must_use]
    pub fn with_handle(settings: ExecutorSettings, handle: Handle) -> Self {
        let core_workers = settings.core_workers.max(1);
        let overflow_workers = settings.max_workers.saturating_sub(core_workers);
        Self {
            inner: Arc::new(Inner {
                handle,
                core_workers,
                overflow_workers,
                pool: Mutex::new(Pool {
                    busy_core: 0,
                    busy_overflow: 0,
                    queue: VecDeque::new(),
                    tasks: JoinSet::new(),
                    shutting_down: false,
                }),
                settings,
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Submit `task` on behalf of the request described by `ctx`.
    ///
    /// When every worker is busy and the queue is full the task runs on the
    /// caller before this returns.
    ///
    /// # Errors
    /// Returns [`ExecutorError::ShutDown`] once [`shutdown`](Self::shutdown)
    /// has started.
    pub async fn submit<F>(&self, ctx: &RequestContext, task: F) -> Result<Submission, ExecutorError>
    where
        F: Future<Output = Result<(), Report>> + Send + 'static,
    {
        let task_name = self.next_task_name();
        let ctx = *ctx;
        let job = run(task_name.clone(), ctx, task).boxed();

        let (admission, inline) = self.admit(job)?;
        if let Some(job) = inline {
            warn!(
                task = %task_name,
                trace_id = ctx.trace_id().map(display),
                "task executor saturated; running task on caller"
            );
            job.await;
        }
        Ok(Submission::new(task_name, admission))
    }

    /// Place `job` on a worker or the queue; hands it back when the caller
    /// must run it.
    fn admit(&self, job: Job) -> Result<(Admission, Option<Job>), ExecutorError> {
        let inner = &self.inner;
        let mut pool = inner.pool.lock().map_err(|_| ExecutorError::StatePoisoned)?;
        if pool.shutting_down {
            return Err(ExecutorError::ShutDown);
        }
        while pool.tasks.try_join_next().is_some() {}

        if pool.busy_core < inner.core_workers {
            pool.busy_core += 1;
            pool.tasks
                .spawn_on(work(Arc::clone(inner), Worker::Core, job), &inner.handle);
            return Ok((Admission::Spawned, None));
        }
        if pool.queue.len() < inner.settings.queue_capacity {
            pool.queue.push_back(job);
            return Ok((Admission::Queued, None));
        }
        if pool.busy_overflow < inner.overflow_workers {
            pool.busy_overflow += 1;
            pool.tasks
                .spawn_on(work(Arc::clone(inner), Worker::Overflow, job), &inner.handle);
            return Ok((Admission::Overflow, None));
        }
        Ok((Admission::CallerRan, Some(job)))
    }

    /// Stop admission and wait for running and queued tasks.
    ///
    /// Tasks still running after the configured grace period are aborted and
    /// tasks still queued are dropped; both count as aborted.
    pub async fn shutdown(&self) -> ShutdownOutcome {
        let (mut tasks, queued) = {
            let mut pool = self.inner.pool();
            pool.shutting_down = true;
            (std::mem::take(&mut pool.tasks), pool.queue.len())
        };

        let grace = self.inner.settings.await_termination;
        info!(running = tasks.len(), queued, ?grace, "task executor shutting down");
        let drained = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        match drained {
            Ok(()) => {
                info!("task executor drained");
                ShutdownOutcome::Drained
            }
            Err(_) => {
                let running = tasks.len();
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                let dropped = {
                    let mut pool = self.inner.pool();
                    let dropped = pool.queue.len();
                    pool.queue.clear();
                    dropped
                };
                let aborted = running + dropped;
                warn!(aborted, "task executor grace period elapsed; aborted tasks");
                ShutdownOutcome::TimedOut { aborted }
            }
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has started.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.inner.pool().shutting_down
    }

    fn next_task_name(&self) -> String {
        let n = self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{n}", self.inner.settings.task_name_prefix)
    }
}

async fn run<F>(name: String, ctx: RequestContext, task: F)
where
    F: Future<Output = Result<(), Report>>,
{
    let trace_id = ctx.trace_id().map(display);
    let span = info_span!("async_task", task = %name, trace_id);
    async {
        match AssertUnwindSafe(task).catch_unwind().await {
            Ok(Ok(())) => debug!("task completed"),
            Ok(Err(report)) => error!(error = ?report, "task failed"),
            Err(panic) => error!(panic = panic_message(panic.as_ref()), "task panicked"),
        }
    }
    .instrument(span)
    .await;
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests;
