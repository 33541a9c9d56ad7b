// Report Poller - drives a poll loop against one report handle

use crate::domain::ReportHandle;
use crate::error::{AppError, Result};
use crate::port::Transport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Poll loop tuning knobs, overridable per poller
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval_ms: u64,
    /// Overall deadline measured from loop start
    pub timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            timeout_ms: 60_000,
        }
    }
}

/// Polls one report until a terminal state or the deadline.
///
/// State machine: PENDING until the handle carries a url (READY), an
/// explicit `failed`/`error` status (FAILED), or the deadline elapses
/// (TIMEOUT). Fetch failures are transient: they never count toward a cap
/// and the loop retries after one interval, bounded only by the overall
/// timeout. This is deliberately unlike the save queue's fixed attempt cap.
///
/// There is no separate cancellation primitive; dropping the future
/// returned by [`poll`](Self::poll) cancels the pending interval sleep.
pub struct ReportPoller {
    transport: Arc<dyn Transport>,
    config: PollConfig,
}

impl ReportPoller {
    pub fn new(transport: Arc<dyn Transport>, config: PollConfig) -> Self {
        Self { transport, config }
    }

    /// Poll until READY, FAILED, or TIMEOUT.
    ///
    /// `on_progress` is invoked synchronously once per iteration that
    /// carries a progress value, with exactly the values the transport
    /// returned. Progress is not guaranteed monotonic; callers must
    /// tolerate repeats and decreases.
    ///
    /// # Errors
    ///
    /// - [`AppError::ReportFailed`] on an explicit failure status, raised
    ///   immediately without waiting another interval.
    /// - [`AppError::PollTimeout`] once the deadline elapses, checked
    ///   before each fetch.
    pub async fn poll(
        &self,
        report_id: &str,
        mut on_progress: impl FnMut(u8),
    ) -> Result<ReportHandle> {
        let started = tokio::time::Instant::now();
        let interval = Duration::from_millis(self.config.interval_ms);

        debug!(report_id = %report_id, "Starting report poll loop");

        loop {
            if started.elapsed().as_millis() as u64 >= self.config.timeout_ms {
                warn!(
                    report_id = %report_id,
                    timeout_ms = %self.config.timeout_ms,
                    "Report polling timed out"
                );
                return Err(AppError::PollTimeout {
                    timeout_ms: self.config.timeout_ms,
                });
            }

            match self.transport.get_report_status(report_id).await {
                Ok(handle) => {
                    if let Some(progress) = handle.progress {
                        on_progress(progress);
                    }

                    if handle.is_ready() {
                        info!(report_id = %report_id, url = ?handle.url, "Report ready");
                        return Ok(handle);
                    }

                    if handle.is_failed() {
                        warn!(report_id = %report_id, status = ?handle.status, "Report generation failed");
                        return Err(AppError::ReportFailed);
                    }
                }
                Err(e) => {
                    // Transient fetch error, retry after one interval.
                    debug!(report_id = %report_id, error = %e, "Status fetch failed, will retry");
                }
            }

            tokio::time::sleep(interval).await;
        }
    }
}
