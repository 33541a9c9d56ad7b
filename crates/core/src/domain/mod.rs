// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod report;

// Re-exports
pub use error::DomainError;
pub use job::{AnswerPair, JobId, ProductId, SaveJob};
pub use report::{ReportHandle, ReportId};
