// Port Layer - Interfaces for external dependencies

pub mod connectivity;
pub mod id_provider; // For deterministic testing
pub mod queue_store;
pub mod time_provider;
pub mod transport;

// Re-exports
pub use connectivity::{ConnectivityProbe, WatchConnectivityProbe};
pub use id_provider::IdProvider;
pub use queue_store::{InMemoryQueueStore, QueueStore};
pub use time_provider::TimeProvider;
pub use transport::{Answer, Transport};
