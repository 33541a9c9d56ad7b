// Durable Retry Queue - ordered store of pending saves with backoff

use crate::application::retry::{RetryDecision, RetryPolicy};
use crate::domain::{AnswerPair, JobId, SaveJob};
use crate::error::Result;
use crate::port::{Answer, ConnectivityProbe, IdProvider, QueueStore, TimeProvider, Transport};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What to do when the durable store cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageReadPolicy {
    /// Treat an unreadable store as empty (availability over strict
    /// durability, the queued jobs are lost)
    FailOpen,
    /// Propagate the storage error to the caller
    FailLoud,
}

/// Queue tuning knobs, all overridable per construction
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub read_failure: StorageReadPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
            read_failure: StorageReadPolicy::FailOpen,
        }
    }
}

/// Counters for one flush pass, surfaced for logging and the UI's
/// pending-count signal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    /// The probe reported offline, nothing was touched
    pub offline: bool,
    pub submitted: usize,
    pub failed: usize,
    pub skipped_waiting: usize,
    pub skipped_exhausted: usize,
    /// Jobs left in the store after the pass
    pub remaining: usize,
}

/// Durable, ordered store of pending save jobs with backoff and a retry
/// cap.
///
/// The store holds one named snapshot, replaced wholesale after every
/// mutation. Insertion order is preserved and is the flush iteration order;
/// it is not a strict delivery-order guarantee, since failed jobs are
/// revisited in the same relative position on later passes.
///
/// Every read-modify-overwrite cycle runs under one internal mutex, so
/// overlapping flush invocations (debounce-triggered vs manual) serialize
/// instead of racing on `attempts`/`next_attempt_at`.
pub struct RetryQueue {
    store: Arc<dyn QueueStore>,
    transport: Arc<dyn Transport>,
    probe: Arc<dyn ConnectivityProbe>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    policy: RetryPolicy,
    read_failure: StorageReadPolicy,
    store_lock: Mutex<()>,
}

impl RetryQueue {
    pub fn new(
        store: Arc<dyn QueueStore>,
        transport: Arc<dyn Transport>,
        probe: Arc<dyn ConnectivityProbe>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        config: QueueConfig,
    ) -> Self {
        Self {
            store,
            transport,
            probe,
            id_provider,
            time_provider,
            policy: RetryPolicy::new(config.max_attempts, config.base_delay_ms, config.max_delay_ms),
            read_failure: config.read_failure,
            store_lock: Mutex::new(()),
        }
    }

    /// Append a new job to the end of the durable sequence.
    ///
    /// Always succeeds locally: storage failures are logged and swallowed
    /// regardless of the read policy, favoring availability.
    pub async fn enqueue(&self, product_id: &str, payload: Vec<AnswerPair>) -> JobId {
        let _guard = self.store_lock.lock().await;

        let mut jobs = match self.store.load().await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(error = %e, "Queue store unreadable on enqueue, starting from empty");
                Vec::new()
            }
        };

        let job = SaveJob::new(self.id_provider.generate_id(), product_id, payload);
        let job_id = job.id.clone();
        jobs.push(job);

        if let Err(e) = self.store.store(&jobs).await {
            warn!(job_id = %job_id, error = %e, "Failed to persist enqueued job");
        } else {
            info!(job_id = %job_id, product_id = %product_id, pending = jobs.len(), "Enqueued save job");
        }

        job_id
    }

    /// Count of jobs currently in the durable store.
    ///
    /// Reads fail-open here even under `FailLoud`: the count feeds a UI
    /// signal and must not error. Use [`RetryQueue::jobs`] for a
    /// policy-honoring read.
    pub async fn len(&self) -> usize {
        let _guard = self.store_lock.lock().await;
        match self.store.load().await {
            Ok(jobs) => jobs.len(),
            Err(e) => {
                warn!(error = %e, "Queue store unreadable, reporting empty");
                0
            }
        }
    }

    /// Snapshot of the pending jobs, honoring the configured read policy.
    pub async fn jobs(&self) -> Result<Vec<SaveJob>> {
        let _guard = self.store_lock.lock().await;
        self.load_with_policy().await
    }

    /// One pass over a snapshot of the current queue.
    ///
    /// Offline is a no-op that leaves the store untouched and never invokes
    /// the transport. Otherwise each job in snapshot order is either
    /// skipped (backoff window still open, or attempts exhausted) or
    /// submitted; successes are dropped, failures get `attempts` bumped and
    /// a new backoff window. The resulting sequence replaces the prior
    /// snapshot wholesale. Per-job failures never propagate: the only error
    /// this returns is a storage read failure under
    /// `StorageReadPolicy::FailLoud`.
    ///
    /// Safe to call repeatedly; concurrent invocations serialize on the
    /// internal lock.
    pub async fn flush(&self) -> Result<FlushOutcome> {
        if !self.probe.is_online() {
            debug!("Offline, skipping queue flush");
            return Ok(FlushOutcome {
                offline: true,
                ..FlushOutcome::default()
            });
        }

        let _guard = self.store_lock.lock().await;

        let snapshot = self.load_with_policy().await?;
        if snapshot.is_empty() {
            debug!("Queue is empty");
            return Ok(FlushOutcome::default());
        }

        info!(jobs = snapshot.len(), "Flushing save queue");

        let now = self.time_provider.now_millis();
        let mut outcome = FlushOutcome::default();
        let mut kept: Vec<SaveJob> = Vec::with_capacity(snapshot.len());

        for mut job in snapshot {
            match self.policy.assess(&job, now) {
                RetryDecision::Waiting { until } => {
                    debug!(job_id = %job.id, until = until, "Skipping job, waiting for backoff");
                    outcome.skipped_waiting += 1;
                    kept.push(job);
                }
                RetryDecision::Exhausted => {
                    outcome.skipped_exhausted += 1;
                    kept.push(job);
                }
                RetryDecision::Due => {
                    let answers = wire_answers(&job.payload);
                    match self.transport.submit_answers(&job.product_id, &answers).await {
                        Ok(()) => {
                            info!(job_id = %job.id, product_id = %job.product_id, "Job delivered");
                            outcome.submitted += 1;
                            // Success: the job is not carried forward.
                        }
                        Err(e) => {
                            self.policy.schedule_retry(&mut job, now);
                            warn!(
                                job_id = %job.id,
                                attempts = %job.attempts,
                                error = %e,
                                "Job delivery failed"
                            );
                            outcome.failed += 1;
                            kept.push(job);
                        }
                    }
                }
            }
        }

        outcome.remaining = kept.len();
        if let Err(e) = self.store.store(&kept).await {
            warn!(error = %e, "Failed to persist queue snapshot after flush");
        }

        info!(
            submitted = outcome.submitted,
            failed = outcome.failed,
            skipped_waiting = outcome.skipped_waiting,
            skipped_exhausted = outcome.skipped_exhausted,
            remaining = outcome.remaining,
            "Queue flush complete"
        );

        Ok(outcome)
    }

    /// Clear the retry bookkeeping of every exhausted job so the next flush
    /// attempts them again.
    ///
    /// This is the explicit reset path for jobs stuck at the attempt cap;
    /// manual retry itself goes through [`RetryQueue::flush`] and never
    /// bypasses the cap. Returns the number of jobs reset.
    pub async fn reset_exhausted(&self) -> Result<usize> {
        let _guard = self.store_lock.lock().await;

        let mut jobs = self.load_with_policy().await?;
        let mut reset = 0;
        for job in jobs.iter_mut() {
            if job.attempts >= self.policy.max_attempts() {
                job.reset_attempts();
                reset += 1;
            }
        }

        if reset > 0 {
            self.store.store(&jobs).await?;
            info!(reset = reset, "Reset exhausted jobs for redelivery");
        }

        Ok(reset)
    }

    async fn load_with_policy(&self) -> Result<Vec<SaveJob>> {
        match self.store.load().await {
            Ok(jobs) => Ok(jobs),
            Err(e) => match self.read_failure {
                StorageReadPolicy::FailOpen => {
                    warn!(error = %e, "Queue store unreadable, treating as empty");
                    Ok(Vec::new())
                }
                StorageReadPolicy::FailLoud => Err(e),
            },
        }
    }
}

/// Reshape queued payload pairs into the transport's answer format.
fn wire_answers(payload: &[AnswerPair]) -> Vec<Answer> {
    payload
        .iter()
        .map(|pair| Answer::new(&pair.question_key, pair.answer.clone()))
        .collect()
}
