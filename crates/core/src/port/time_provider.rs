// Wall Clock Port

/// Clock seam behind backoff windows and last-saved timestamps. Injected
/// so tests can pin or step time instead of sleeping.
pub trait TimeProvider: Send + Sync {
    /// Current time as milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Chrono-backed wall clock (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
