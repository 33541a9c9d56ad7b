// formsync Infrastructure - File Adapter

pub mod queue_store;

pub use queue_store::FileQueueStore;
