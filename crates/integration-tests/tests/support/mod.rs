// Shared test doubles for the integration scenarios
#![allow(dead_code)]

use async_trait::async_trait;
use formsync_core::domain::{AnswerPair, ReportHandle};
use formsync_core::error::Result;
use formsync_core::port::{Answer, IdProvider, TimeProvider, Transport};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

/// Transport with scripted submit results and report statuses. Unscripted
/// submits succeed; unscripted status fetches repeat the last status.
#[derive(Default)]
pub struct ScriptedTransport {
    submit_results: Mutex<VecDeque<Result<()>>>,
    submitted: Mutex<Vec<(String, Vec<Answer>)>>,
    statuses: Mutex<VecDeque<Result<ReportHandle>>>,
    last_status: Mutex<Option<ReportHandle>>,
}

impl ScriptedTransport {
    pub fn script_submits(&self, results: Vec<Result<()>>) {
        *self.submit_results.lock().unwrap() = results.into();
    }

    pub fn script_statuses(&self, statuses: Vec<Result<ReportHandle>>) {
        *self.statuses.lock().unwrap() = statuses.into();
    }

    pub fn submissions(&self) -> Vec<(String, Vec<Answer>)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit_answers(&self, product_id: &str, answers: &[Answer]) -> Result<()> {
        self.submitted
            .lock()
            .unwrap()
            .push((product_id.to_string(), answers.to_vec()));
        self.submit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn get_report_status(&self, report_id: &str) -> Result<ReportHandle> {
        match self.statuses.lock().unwrap().pop_front() {
            Some(Ok(handle)) => {
                *self.last_status.lock().unwrap() = Some(handle.clone());
                Ok(handle)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self
                .last_status
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| ReportHandle::pending(report_id))),
        }
    }
}

/// Manually advanced clock
pub struct MutableTimeProvider {
    now: AtomicI64,
}

impl MutableTimeProvider {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: i64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeProvider for MutableTimeProvider {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Deterministic job IDs (job-1, job-2, ...)
#[derive(Default)]
pub struct SequentialIdProvider {
    counter: AtomicU64,
}

impl IdProvider for SequentialIdProvider {
    fn generate_id(&self) -> String {
        format!("job-{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub fn answers() -> Vec<AnswerPair> {
    vec![
        AnswerPair::new("q1", serde_json::json!("yes")),
        AnswerPair::new("q2", serde_json::json!(3)),
    ]
}
