// Save-Job ID Port

/// ID seam for newly enqueued save jobs. Injected so tests get
/// deterministic, assertable ids.
pub trait IdProvider: Send + Sync {
    /// Generate a unique id for one save job
    fn generate_id(&self) -> String;
}

/// UUID v4 ids (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
