// Application Layer - Services driving the resilience subsystem

pub mod autosave;
pub mod poller;
pub mod queue;
pub mod retry;

// Re-exports
pub use autosave::{AutosaveConfig, AutosaveScheduler};
pub use poller::{PollConfig, ReportPoller};
pub use queue::{FlushOutcome, QueueConfig, RetryQueue, StorageReadPolicy};
pub use retry::{RetryDecision, RetryPolicy};
