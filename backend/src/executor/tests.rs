//! Tests for task admission, failure isolation and shutdown.

use super::*;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;

use color_eyre::eyre::eyre;
use rstest::{fixture, rstest};
use tokio::sync::oneshot;

use crate::TraceId;

fn settings(core: usize, max: usize, queue: usize) -> ExecutorSettings {
    ExecutorSettings {
        core_workers: core,
        max_workers: max,
        queue_capacity: queue,
        await_termination: Duration::from_secs(5),
        task_name_prefix: "test-task-".to_owned(),
    }
}

#[fixture]
fn ctx() -> RequestContext {
    RequestContext::new(TraceId::generate())
}

/// Task that finishes once `release` fires, counting completions.
fn gated(
    release: oneshot::Receiver<()>,
    done: Arc<AtomicUsize>,
) -> impl Future<Output = Result<(), Report>> + Send + 'static {
    async move {
        let _ = release.await;
        done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counted(done: Arc<AtomicUsize>) -> impl Future<Output = Result<(), Report>> + Send + 'static {
    async move {
        done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn explode() -> Result<(), Report> {
    panic!("task panicked")
}

#[rstest]
#[tokio::test]
async fn free_core_worker_runs_task(ctx: RequestContext) {
    let executor = TaskExecutor::new(settings(1, 1, 0)).expect("runtime available");
    let done = Arc::new(AtomicUsize::new(0));

    let submission = executor
        .submit(&ctx, counted(Arc::clone(&done)))
        .await
        .expect("task accepted");

    assert_eq!(submission.admission(), Admission::Spawned);
    assert_eq!(submission.task_name(), "test-task-1");
    assert_eq!(executor.shutdown().await, ShutdownOutcome::Drained);
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn saturated_pool_queues_then_runs_on_caller(ctx: RequestContext) {
    let executor = TaskExecutor::new(settings(1, 1, 1)).expect("runtime available");
    let done = Arc::new(AtomicUsize::new(0));
    let (release, gate) = oneshot::channel();

    let first = executor
        .submit(&ctx, gated(gate, Arc::clone(&done)))
        .await
        .expect("first accepted");
    let second = executor
        .submit(&ctx, counted(Arc::clone(&done)))
        .await
        .expect("second accepted");
    assert_eq!(first.admission(), Admission::Spawned);
    assert_eq!(second.admission(), Admission::Queued);

    let third = executor
        .submit(&ctx, counted(Arc::clone(&done)))
        .await
        .expect("third accepted");
    assert_eq!(third.admission(), Admission::CallerRan);
    assert_eq!(done.load(Ordering::SeqCst), 1, "caller ran the third task inline");

    release.send(()).expect("gate open");
    assert_eq!(executor.shutdown().await, ShutdownOutcome::Drained);
    assert_eq!(done.load(Ordering::SeqCst), 3);
}

#[rstest]
#[tokio::test]
async fn full_queue_spills_to_overflow_workers(ctx: RequestContext) {
    let executor = TaskExecutor::new(settings(1, 2, 0)).expect("runtime available");
    let done = Arc::new(AtomicUsize::new(0));
    let (release, gate) = oneshot::channel();

    executor
        .submit(&ctx, gated(gate, Arc::clone(&done)))
        .await
        .expect("first accepted");
    let second = executor
        .submit(&ctx, counted(Arc::clone(&done)))
        .await
        .expect("second accepted");

    assert_eq!(second.admission(), Admission::Overflow);
    release.send(()).expect("gate open");
    assert_eq!(executor.shutdown().await, ShutdownOutcome::Drained);
    assert_eq!(done.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queued_tasks_start_in_arrival_order(ctx: RequestContext) {
    let executor = TaskExecutor::new(settings(1, 1, 8)).expect("runtime available");
    let done = Arc::new(AtomicUsize::new(0));
    let order = Arc::new(AsyncMutex::new(Vec::new()));
    let (release, gate) = oneshot::channel();

    executor
        .submit(&ctx, gated(gate, Arc::clone(&done)))
        .await
        .expect("first accepted");
    for n in 1..=8 {
        let order = Arc::clone(&order);
        let submission = executor
            .submit(&ctx, async move {
                order.lock().await.push(n);
                Ok(())
            })
            .await
            .expect("queued task accepted");
        assert_eq!(submission.admission(), Admission::Queued);
    }

    release.send(()).expect("gate open");
    assert_eq!(executor.shutdown().await, ShutdownOutcome::Drained);
    assert_eq!(*order.lock().await, (1..=8).collect::<Vec<_>>());
}

#[rstest]
#[tokio::test]
async fn queued_tasks_are_dropped_when_grace_period_elapses(ctx: RequestContext) {
    let mut config = settings(1, 1, 2);
    config.await_termination = Duration::from_millis(20);
    let executor = TaskExecutor::new(config).expect("runtime available");
    let done = Arc::new(AtomicUsize::new(0));

    executor
        .submit(&ctx, std::future::pending::<Result<(), Report>>())
        .await
        .expect("stuck task accepted");
    for _ in 0..2 {
        executor
            .submit(&ctx, counted(Arc::clone(&done)))
            .await
            .expect("queued task accepted");
    }

    assert_eq!(
        executor.shutdown().await,
        ShutdownOutcome::TimedOut { aborted: 3 }
    );
    assert_eq!(done.load(Ordering::SeqCst), 0);
}

#[rstest]
#[tokio::test]
async fn task_failures_do_not_reach_submitter(ctx: RequestContext) {
    let executor = TaskExecutor::new(settings(2, 2, 0)).expect("runtime available");

    executor
        .submit(&ctx, async { Err(eyre!("task blew up")) })
        .await
        .expect("failing task accepted");
    executor
        .submit(&ctx, explode())
        .await
        .expect("panicking task accepted");

    assert_eq!(executor.shutdown().await, ShutdownOutcome::Drained);
}

#[rstest]
#[tokio::test]
async fn shutdown_aborts_tasks_past_grace_period(ctx: RequestContext) {
    let mut config = settings(1, 1, 0);
    config.await_termination = Duration::from_millis(20);
    let executor = TaskExecutor::new(config).expect("runtime available");

    executor
        .submit(&ctx, std::future::pending::<Result<(), Report>>())
        .await
        .expect("stuck task accepted");

    assert_eq!(
        executor.shutdown().await,
        ShutdownOutcome::TimedOut { aborted: 1 }
    );
}

#[rstest]
#[tokio::test]
async fn submissions_after_shutdown_are_rejected(ctx: RequestContext) {
    let executor = TaskExecutor::new(settings(1, 1, 0)).expect("runtime available");
    assert_eq!(executor.shutdown().await, ShutdownOutcome::Drained);
    assert!(executor.is_shut_down());

    let result = executor.submit(&ctx, async { Ok(()) }).await;
    assert!(matches!(result, Err(ExecutorError::ShutDown)));
}

#[rstest]
fn building_outside_a_runtime_fails() {
    let result = TaskExecutor::new(ExecutorSettings::default());
    assert!(matches!(result, Err(ExecutorError::NoRuntime)));
}

#[rstest]
#[case(Admission::Spawned, "spawned")]
#[case(Admission::CallerRan, "callerRan")]
fn admission_serialises_camel_case(#[case] admission: Admission, #[case] expected: &str) {
    let value = serde_json::to_value(admission).expect("serialise admission");
    assert_eq!(value, serde_json::Value::String(expected.to_owned()));
}
