//! Durability scenarios: the queue survives process restarts and keeps
//! backoff state across sessions.

mod support;

use formsync_core::application::{QueueConfig, RetryQueue, StorageReadPolicy};
use formsync_core::error::AppError;
use formsync_core::port::connectivity::WatchConnectivityProbe;
use std::path::Path;
use std::sync::Arc;
use support::{answers, MutableTimeProvider, ScriptedTransport, SequentialIdProvider};

use formsync_infra_file::FileQueueStore;

fn build_queue(
    path: &Path,
    transport: Arc<ScriptedTransport>,
    probe: Arc<WatchConnectivityProbe>,
    time: Arc<MutableTimeProvider>,
) -> RetryQueue {
    RetryQueue::new(
        Arc::new(FileQueueStore::new(path)),
        transport,
        probe,
        Arc::new(SequentialIdProvider::default()),
        time,
        QueueConfig::default(),
    )
}

#[tokio::test]
async fn queue_survives_restart_with_backoff_state_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    let probe = Arc::new(WatchConnectivityProbe::new(true));
    let time = Arc::new(MutableTimeProvider::new(1_000_000));

    // Session 1: the save fails once, leaving a job with one attempt and
    // an open backoff window in the snapshot.
    {
        let transport = Arc::new(ScriptedTransport::default());
        transport.script_submits(vec![Err(AppError::Transport("down".to_string()))]);
        let queue = build_queue(&path, transport, probe.clone(), time.clone());

        queue.enqueue("product-1", answers()).await;
        let outcome = queue.flush().await.unwrap();
        assert_eq!(outcome.failed, 1);
    }

    // Session 2: a fresh queue over the same file sees the job, honors the
    // persisted window, and delivers once it elapses.
    {
        let transport = Arc::new(ScriptedTransport::default());
        let queue = build_queue(&path, transport.clone(), probe.clone(), time.clone());

        assert_eq!(queue.len().await, 1);
        let job = queue.jobs().await.unwrap().remove(0);
        assert_eq!(job.attempts, 1);
        assert_eq!(job.next_attempt_at, Some(1_002_000));

        // Window still open: nothing is attempted.
        let outcome = queue.flush().await.unwrap();
        assert_eq!(outcome.skipped_waiting, 1);
        assert!(transport.submissions().is_empty());

        time.set(1_002_000);
        let outcome = queue.flush().await.unwrap();
        assert_eq!(outcome.submitted, 1);
        assert_eq!(queue.len().await, 0);
    }

    // The drained snapshot persists too.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[tokio::test]
async fn offline_flush_leaves_the_snapshot_byte_for_byte_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    let probe = Arc::new(WatchConnectivityProbe::new(true));
    let time = Arc::new(MutableTimeProvider::new(1_000_000));
    let transport = Arc::new(ScriptedTransport::default());
    let queue = build_queue(&path, transport.clone(), probe.clone(), time);

    queue.enqueue("product-1", answers()).await;
    let before = std::fs::read(&path).unwrap();

    probe.set_online(false);
    let outcome = queue.flush().await.unwrap();

    assert!(outcome.offline);
    assert!(transport.submissions().is_empty());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn corrupt_snapshot_reads_empty_and_recovers_on_next_enqueue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    std::fs::write(&path, "{ definitely not a queue").unwrap();

    let probe = Arc::new(WatchConnectivityProbe::new(true));
    let time = Arc::new(MutableTimeProvider::new(1_000_000));
    let transport = Arc::new(ScriptedTransport::default());
    let queue = build_queue(&path, transport, probe, time);

    // Default fail-open policy: the corrupt record reads as empty.
    assert_eq!(queue.len().await, 0);

    // Enqueueing replaces the corrupt snapshot with a valid one.
    queue.enqueue("product-1", answers()).await;
    assert_eq!(queue.len().await, 1);
    assert_eq!(queue.jobs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn fail_loud_policy_surfaces_a_corrupt_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    std::fs::write(&path, "{ definitely not a queue").unwrap();

    let queue = RetryQueue::new(
        Arc::new(FileQueueStore::new(&path)),
        Arc::new(ScriptedTransport::default()),
        Arc::new(WatchConnectivityProbe::new(true)),
        Arc::new(SequentialIdProvider::default()),
        Arc::new(MutableTimeProvider::new(1_000_000)),
        QueueConfig {
            read_failure: StorageReadPolicy::FailLoud,
            ..QueueConfig::default()
        },
    );

    let err = queue.flush().await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
}

#[tokio::test]
async fn exhausted_job_survives_restarts_until_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue.json");
    let probe = Arc::new(WatchConnectivityProbe::new(true));
    let time = Arc::new(MutableTimeProvider::new(1_000_000));

    // Burn through every attempt.
    {
        let transport = Arc::new(ScriptedTransport::default());
        transport.script_submits(
            (0..5)
                .map(|_| Err(AppError::Transport("down".to_string())))
                .collect(),
        );
        let queue = build_queue(&path, transport, probe.clone(), time.clone());
        queue.enqueue("product-1", answers()).await;

        for _ in 0..5 {
            queue.flush().await.unwrap();
            let until = queue.jobs().await.unwrap()[0].next_attempt_at.unwrap();
            time.set(until);
        }
        assert_eq!(queue.jobs().await.unwrap()[0].attempts, 5);
    }

    // After a restart the job is still there, still skipped, and only an
    // explicit reset reopens delivery.
    {
        let transport = Arc::new(ScriptedTransport::default());
        let queue = build_queue(&path, transport.clone(), probe.clone(), time.clone());

        let outcome = queue.flush().await.unwrap();
        assert_eq!(outcome.skipped_exhausted, 1);
        assert!(transport.submissions().is_empty());

        assert_eq!(queue.reset_exhausted().await.unwrap(), 1);
        let outcome = queue.flush().await.unwrap();
        assert_eq!(outcome.submitted, 1);
        assert_eq!(queue.len().await, 0);
    }
}
