//! Application state shared across all request handlers.

use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
// Note on Ordering: We use Acquire/Release for the shutdown flag to ensure
// visibility across threads on weakly-ordered architectures (ARM).
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across all handlers.
///
/// This struct is cloned for each request, but the inner resources
/// (like `PgPool`) use `Arc` internally so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Service startup time for uptime calculation
    pub startup_time: Arc<Instant>,

    /// Application version from Cargo.toml
    pub version: &'static str,

    /// Whether the service is shutting down (graceful drain)
    pub shutting_down: Arc<AtomicBool>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            startup_time: Arc::new(Instant::now()),
            version: env!("CARGO_PKG_VERSION"),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the service uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.startup_time.elapsed().as_secs()
    }

    /// Check if the service is shutting down.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/claro_never_connected")
            .expect("lazy pool")
    }

    #[tokio::test]
    async fn test_new_state_is_not_shutting_down() {
        let state = AppState::new(lazy_pool());
        assert!(!state.is_shutting_down());
    }

    #[tokio::test]
    async fn test_shutting_down_flag_is_visible_through_clones() {
        let state = AppState::new(lazy_pool());
        let clone = state.clone();
        state.shutting_down.store(true, Ordering::Release);
        assert!(clone.is_shutting_down());
    }
}
