use std::sync::Arc;

use crate::db::{MemoryRepository, MemorySessionStore, RatingsRepository, SessionStore};

/// Shared application state
///
/// Both ports are injected so the same router runs against PostgreSQL/Redis
/// in production and in-memory adapters in tests.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn RatingsRepository>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(repo: Arc<dyn RatingsRepository>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { repo, sessions }
    }

    /// State backed entirely by in-process storage
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(MemorySessionStore::default()),
        )
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
