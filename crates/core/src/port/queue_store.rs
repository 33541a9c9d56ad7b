// Durable Queue Store Port (Interface)

use crate::domain::SaveJob;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// One named durable record holding the full ordered job sequence.
///
/// `load` returns an empty sequence when the record does not exist; a
/// present-but-unreadable record is an error, and how that error is handled
/// (fail-open vs fail-loud) is the queue's policy decision, not the
/// store's. `store` replaces the record wholesale and must be atomic: a
/// reader never observes a partially written snapshot.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Read the current snapshot
    async fn load(&self) -> Result<Vec<SaveJob>>;

    /// Overwrite the snapshot atomically
    async fn store(&self, jobs: &[SaveJob]) -> Result<()>;
}

/// Non-persistent store (opt-out of durability, also used in tests)
#[derive(Default)]
pub struct InMemoryQueueStore {
    jobs: Mutex<Vec<SaveJob>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn load(&self) -> Result<Vec<SaveJob>> {
        Ok(self.jobs.lock().expect("queue store lock poisoned").clone())
    }

    async fn store(&self, jobs: &[SaveJob]) -> Result<()> {
        *self.jobs.lock().expect("queue store lock poisoned") = jobs.to_vec();
        Ok(())
    }
}
