// Save Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (UUID v4 in production, injected via IdProvider)
pub type JobId = String;

/// Target resource identifier (the product whose answers are being saved)
pub type ProductId = String;

/// One answer as captured by the form layer: `{question_key, answer}`.
///
/// This is the queue's payload shape. A flush pass reshapes it into the
/// transport's `Answer` wire format (`{question_id, value}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPair {
    pub question_key: String,
    pub answer: serde_json::Value,
}

impl AnswerPair {
    pub fn new(question_key: impl Into<String>, answer: serde_json::Value) -> Self {
        Self {
            question_key: question_key.into(),
            answer,
        }
    }
}

/// A pending save awaiting delivery through the transport.
///
/// Lifecycle: created when a direct save attempt fails; mutated only by a
/// flush pass (`attempts` increments, `next_attempt_at` set); destroyed only
/// on a successful transport call. `attempts` is monotonically
/// non-decreasing and `next_attempt_at` is present only after a failed
/// attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveJob {
    pub id: JobId,
    pub product_id: ProductId,
    pub payload: Vec<AnswerPair>,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_attempt_at: Option<i64>, // epoch ms
}

impl SaveJob {
    /// Create a new job with an injected ID (fresh jobs start at zero
    /// attempts with no backoff window).
    pub fn new(id: impl Into<String>, product_id: impl Into<String>, payload: Vec<AnswerPair>) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            payload,
            attempts: 0,
            next_attempt_at: None,
        }
    }

    /// Record one failed delivery attempt with explicit timestamps.
    ///
    /// `next_attempt_at` marks the declarative backoff window; flush passes
    /// skip the job until it elapses.
    pub fn record_failure(&mut self, next_attempt_at: i64) {
        self.attempts += 1;
        self.next_attempt_at = Some(next_attempt_at);
    }

    /// Clear retry bookkeeping so the next flush attempts delivery again.
    pub fn reset_attempts(&mut self) {
        self.attempts = 0;
        self.next_attempt_at = None;
    }

    /// Create a test job with deterministic ID (test-1, test-2, ...).
    ///
    /// **Note**: tests only. Production code injects IDs via `IdProvider`.
    pub fn new_test(product_id: impl Into<String>, payload: Vec<AnswerPair>) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        Self::new(format!("test-{}", counter), product_id, payload)
    }
}
