// Retry and backoff policy for the durable save queue

use crate::domain::SaveJob;
use tracing::{info, warn};

/// Per-job assessment made at the start of a flush pass
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Attempt delivery now
    Due,
    /// Keep the job unchanged, its backoff window has not elapsed
    Waiting { until: i64 },
    /// Keep the job unchanged, it has used up its attempts and needs an
    /// explicit reset before it is retried again
    Exhausted,
}

/// Backoff and retry-cap policy
///
/// Delay formula: `min(max_delay, 2^attempts * base_delay)`, computed from
/// the attempt count *after* the failed attempt is recorded (first failure
/// with the defaults waits 2000 ms).
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide what a flush pass should do with `job` at `now_millis`.
    ///
    /// The backoff window is checked before the attempt cap, so a job that
    /// just recorded its final failure reads as waiting until the window
    /// elapses and as exhausted afterwards.
    pub fn assess(&self, job: &SaveJob, now_millis: i64) -> RetryDecision {
        if let Some(until) = job.next_attempt_at {
            if now_millis < until {
                return RetryDecision::Waiting { until };
            }
        }

        if job.attempts >= self.max_attempts {
            warn!(
                job_id = %job.id,
                attempts = %job.attempts,
                max_attempts = %self.max_attempts,
                "Max retry attempts reached"
            );
            return RetryDecision::Exhausted;
        }

        RetryDecision::Due
    }

    /// Exponential backoff delay for a job that has now failed `attempts`
    /// times.
    pub fn backoff_delay_ms(&self, attempts: u32) -> u64 {
        2u64.saturating_pow(attempts)
            .saturating_mul(self.base_delay_ms)
            .min(self.max_delay_ms)
    }

    /// Record a failed delivery attempt and schedule the next one.
    pub fn schedule_retry(&self, job: &mut SaveJob, now_millis: i64) {
        let delay_ms = self.backoff_delay_ms(job.attempts + 1);
        job.record_failure(now_millis + delay_ms as i64);

        info!(
            job_id = %job.id,
            attempt = %job.attempts,
            max_attempts = %self.max_attempts,
            delay_ms = %delay_ms,
            "Scheduling retry"
        );
    }
}
