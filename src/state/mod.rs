//! Shared application state.

mod feed;

use std::sync::Arc;

use crate::{config::AppConfig, dao::match_store::MatchStore};

pub use self::feed::MatchFeed;

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Default per-match event channel capacity.
const FEED_CAPACITY: usize = 16;

/// Central application state holding the store handle, the runtime
/// configuration and the per-match change feed.
pub struct AppState {
    store: Arc<dyn MatchStore>,
    config: AppConfig,
    feed: MatchFeed,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be
    /// cloned cheaply. The store is injected up front; if it cannot be
    /// built the process fails at startup rather than limping along.
    pub fn new(store: Arc<dyn MatchStore>, config: AppConfig) -> SharedState {
        Arc::new(Self {
            store,
            config,
            feed: MatchFeed::new(FEED_CAPACITY),
        })
    }

    /// Handle to the persisted match store.
    pub fn store(&self) -> Arc<dyn MatchStore> {
        self.store.clone()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Per-match change feed used by the SSE surface.
    pub fn feed(&self) -> &MatchFeed {
        &self.feed
    }
}
