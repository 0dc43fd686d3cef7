// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    active_connections: AtomicUsize,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Reserve a connection slot, `false` when the configured limit is reached
    pub fn try_acquire_connection(&self) -> bool {
        // Increment first, then check limit (prevents race condition)
        let prev = self.active_connections.fetch_add(1, Ordering::SeqCst);
        let Some(max) = self.config.performance.max_connections else {
            return true;
        };
        if prev >= usize::try_from(max).unwrap_or(usize::MAX) {
            self.active_connections.fetch_sub(1, Ordering::SeqCst);
            return false;
        }
        true
    }

    pub fn release_connection(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_limit(limit: Option<u64>) -> Config {
        let mut cfg = Config::load_from("definitely/not/a/config/file").unwrap();
        cfg.performance.max_connections = limit;
        cfg
    }

    #[test]
    fn test_connection_limit() {
        let state = AppState::new(config_with_limit(Some(1)));
        assert!(state.try_acquire_connection());
        assert!(!state.try_acquire_connection());
        assert_eq!(state.active_connections(), 1);

        state.release_connection();
        assert!(state.try_acquire_connection());
    }

    #[test]
    fn test_unlimited_connections() {
        let state = AppState::new(config_with_limit(None));
        for _ in 0..10 {
            assert!(state.try_acquire_connection());
        }
        assert_eq!(state.active_connections(), 10);
    }
}
