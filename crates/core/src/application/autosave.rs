// Autosave Scheduler - debounced direct saves with offline queue fallback

use crate::application::queue::{FlushOutcome, RetryQueue};
use crate::domain::AnswerPair;
use crate::error::Result;
use crate::port::{Answer, ConnectivityProbe, TimeProvider, Transport};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Scheduler tuning knobs
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet period after the last mutation before a save fires
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { debounce_ms: 2000 }
    }
}

struct EditState {
    product_id: Option<String>,
    /// Insertion-ordered answer set; the order is the submit order
    answers: IndexMap<String, serde_json::Value>,
    enabled: bool,
    timer: Option<JoinHandle<()>>,
}

/// Debounces edits into direct saves, falling back to the retry queue on
/// failure.
///
/// Every mutation cancels and restarts the debounce timer (last-write-wins
/// scheduling, not batching). The timer only arms while enabled, a target
/// product is assigned, and the answer set is non-empty. Side effects are
/// confined to the outstanding timer, the durable queue store, and the two
/// caller-observable signals ([`last_saved`](Self::last_saved) and
/// [`pending`](Self::pending)).
///
/// The scheduler subscribes to the connectivity probe and flushes the queue
/// on every offline-to-online edge, plus once at startup when already
/// online (draining jobs left by a prior session). Dropping the scheduler
/// aborts the timer and the connectivity listener.
pub struct AutosaveScheduler {
    transport: Arc<dyn Transport>,
    queue: Arc<RetryQueue>,
    time_provider: Arc<dyn TimeProvider>,
    config: AutosaveConfig,
    state: Mutex<EditState>,
    last_saved_tx: watch::Sender<Option<i64>>,
    pending_tx: watch::Sender<usize>,
    online_listener: Mutex<Option<JoinHandle<()>>>,
    /// Handle to self for the spawned timer task; weak so an abandoned
    /// scheduler is actually dropped
    weak_self: Weak<Self>,
}

impl AutosaveScheduler {
    pub async fn start(
        transport: Arc<dyn Transport>,
        queue: Arc<RetryQueue>,
        probe: Arc<dyn ConnectivityProbe>,
        time_provider: Arc<dyn TimeProvider>,
        config: AutosaveConfig,
    ) -> Arc<Self> {
        let (last_saved_tx, _) = watch::channel(None);
        let (pending_tx, _) = watch::channel(0);

        let scheduler = Arc::new_cyclic(|weak_self| Self {
            transport,
            queue,
            time_provider,
            config,
            state: Mutex::new(EditState {
                product_id: None,
                answers: IndexMap::new(),
                enabled: true,
                timer: None,
            }),
            last_saved_tx,
            pending_tx,
            online_listener: Mutex::new(None),
            weak_self: weak_self.clone(),
        });

        // Edge-triggered flush on connectivity restore.
        let mut rx = probe.subscribe();
        let weak = scheduler.weak_self.clone();
        let listener = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if !online {
                    continue;
                }
                let Some(scheduler) = weak.upgrade() else {
                    break;
                };
                info!("Connectivity restored, flushing save queue");
                if let Err(e) = scheduler.flush_now().await {
                    warn!(error = %e, "Flush after reconnect failed");
                }
            }
        });
        *scheduler
            .online_listener
            .lock()
            .expect("listener lock poisoned") = Some(listener);

        scheduler.pending_tx.send_replace(scheduler.queue.len().await);

        // Eager drain of jobs pending from a prior session.
        if probe.is_online() {
            if let Err(e) = scheduler.flush_now().await {
                warn!(error = %e, "Startup flush failed");
            }
        }

        scheduler
    }

    /// Assign or clear the target product. Rearms the debounce timer.
    pub fn set_target(&self, product_id: Option<String>) {
        self.state.lock().expect("state lock poisoned").product_id = product_id;
        self.rearm();
    }

    /// Enable or disable autosaving. Disabling cancels any armed timer.
    pub fn set_enabled(&self, enabled: bool) {
        self.state.lock().expect("state lock poisoned").enabled = enabled;
        self.rearm();
    }

    /// Record one answer mutation. Restarts the debounce timer.
    pub fn record_answer(&self, question_key: impl Into<String>, value: serde_json::Value) {
        self.state
            .lock()
            .expect("state lock poisoned")
            .answers
            .insert(question_key.into(), value);
        self.rearm();
    }

    /// Manual retry: flush the queue and republish the pending count.
    ///
    /// Goes through the normal flush path, so exhausted jobs stay skipped
    /// until [`RetryQueue::reset_exhausted`] clears them.
    pub async fn flush_now(&self) -> Result<FlushOutcome> {
        let result = self.queue.flush().await;
        self.pending_tx.send_replace(self.queue.len().await);
        result
    }

    /// Timestamp (epoch ms) of the last successful direct save. UI feedback
    /// only, no effect on the queue.
    pub fn last_saved(&self) -> watch::Receiver<Option<i64>> {
        self.last_saved_tx.subscribe()
    }

    /// Count of jobs awaiting delivery in the durable queue.
    pub fn pending(&self) -> watch::Receiver<usize> {
        self.pending_tx.subscribe()
    }

    /// Cancel any armed timer and, if arming conditions hold, start a fresh
    /// debounce window.
    fn rearm(&self) {
        let mut state = self.state.lock().expect("state lock poisoned");
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let armed = state.enabled && state.product_id.is_some() && !state.answers.is_empty();
        if !armed {
            return;
        }

        // The quiet period starts at the mutation, not at the spawned
        // task's first poll.
        let weak = self.weak_self.clone();
        let deadline =
            tokio::time::Instant::now() + Duration::from_millis(self.config.debounce_ms);
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(scheduler) = weak.upgrade() {
                scheduler.autosave().await;
            }
        }));
    }

    /// Fire one direct save. Failure is absorbed into the queue, never
    /// propagated.
    async fn autosave(&self) {
        let (product_id, answers) = {
            let state = self.state.lock().expect("state lock poisoned");
            if !state.enabled {
                return;
            }
            let Some(product_id) = state.product_id.clone() else {
                return;
            };
            (product_id, state.answers.clone())
        };

        let wire: Vec<Answer> = answers
            .iter()
            .map(|(key, value)| Answer::new(key.clone(), value.clone()))
            .collect();

        match self.transport.submit_answers(&product_id, &wire).await {
            Ok(()) => {
                debug!(product_id = %product_id, "Autosave succeeded");
                self.last_saved_tx
                    .send_replace(Some(self.time_provider.now_millis()));
            }
            Err(e) => {
                info!(product_id = %product_id, error = %e, "Autosave failed, enqueueing for retry");
                let payload: Vec<AnswerPair> = answers
                    .into_iter()
                    .map(|(key, value)| AnswerPair::new(key, value))
                    .collect();
                self.queue.enqueue(&product_id, payload).await;
                self.pending_tx.send_replace(self.queue.len().await);
            }
        }
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }
        if let Ok(mut listener) = self.online_listener.lock() {
            if let Some(listener) = listener.take() {
                listener.abort();
            }
        }
    }
}
