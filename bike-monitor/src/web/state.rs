//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedQueries;
use crate::citybikes::Feed;
use crate::scheduler::Scheduler;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Runs on-demand ingestion cycles
    pub scheduler: Arc<Scheduler<Feed>>,

    /// Cached read queries
    pub queries: Arc<CachedQueries>,
}

impl AppState {
    pub fn new(scheduler: Arc<Scheduler<Feed>>, queries: CachedQueries) -> Self {
        Self {
            scheduler,
            queries: Arc::new(queries),
        }
    }
}
