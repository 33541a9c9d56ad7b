// Report Handle Domain Model

use serde::{Deserialize, Serialize};

/// Report identifier
pub type ReportId = String;

/// Snapshot of a report-generation operation as returned by the transport.
///
/// Has no independent persistence: a handle lives only for the duration of
/// one poll loop held by the caller. `progress` is 0-100 and not guaranteed
/// monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHandle {
    pub id: ReportId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ReportHandle {
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: None,
            progress: None,
            status: None,
        }
    }

    /// True once the report carries a resolvable URL (terminal READY).
    pub fn is_ready(&self) -> bool {
        self.url.is_some()
    }

    /// True for an explicit terminal failure status (terminal FAILED).
    /// Any other status tag is treated as still pending.
    pub fn is_failed(&self) -> bool {
        matches!(self.status.as_deref(), Some("failed") | Some("error"))
    }
}
