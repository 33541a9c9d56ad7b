// Network Transport Port (Interface)

use crate::domain::ReportHandle;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One answer in the transport's wire format.
///
/// The queue stores `AnswerPair`s (`question_key`/`answer`); a flush pass
/// reshapes them into this format before submitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    pub value: serde_json::Value,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            question_id: question_id.into(),
            value,
        }
    }
}

/// Transport interface for the fixed request/response contract.
///
/// Failures carry no structured payload beyond the error itself; callers
/// treat every error as a transient transport failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit the current answers for a product
    async fn submit_answers(&self, product_id: &str, answers: &[Answer]) -> Result<()>;

    /// Fetch the current status of a report-generation operation
    async fn get_report_status(&self, report_id: &str) -> Result<ReportHandle>;
}
