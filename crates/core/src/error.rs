// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Taxonomy: transient transport failures are absorbed locally (enqueue or
/// backoff) and never surface here from the scheduler or a flush pass.
/// Only the report poller raises fatal variants to its caller.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Report generation failed")]
    ReportFailed,

    #[error("Polling timed out after {timeout_ms} ms")]
    PollTimeout { timeout_ms: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// True for the poller's fatal outcomes (as opposed to transient
    /// transport errors, which the poll loop retries).
    pub fn is_fatal_poll_error(&self) -> bool {
        matches!(self, AppError::ReportFailed | AppError::PollTimeout { .. })
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
