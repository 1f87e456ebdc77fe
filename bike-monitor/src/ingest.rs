//! The extract → normalize → load cycle.
//!
//! One cycle is one unit of work: if the fetch fails nothing is written; if
//! the fetch succeeds the whole batch is written in a single transaction
//! under one shared timestamp.

use std::future::Future;

use tracing::{debug, warn};

use crate::citybikes::{
    CityBikesClient, Feed, FetchError, MockCityBikesClient, RawStation, normalize_stations,
};
use crate::domain::SnapshotTime;
use crate::store::{SnapshotStore, StoreError};

/// Why a cycle failed.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The station list could not be fetched; nothing was written
    #[error("network failure: {0}")]
    NetworkFailure(#[from] FetchError),

    /// The station list was fetched but could not be stored
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StoreError),
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Timestamp shared by every row of the batch.
    pub snapshot_time: SnapshotTime,

    /// Rows written. Zero when the feed reported no stations.
    pub inserted: usize,
}

/// Source of raw station records.
///
/// This abstraction allows the cycle to be tested without network access.
pub trait StationFeed {
    /// Fetch the current station list in a single attempt.
    fn fetch_current_state(
        &self,
    ) -> impl Future<Output = Result<Vec<RawStation>, FetchError>> + Send;
}

impl StationFeed for CityBikesClient {
    fn fetch_current_state(
        &self,
    ) -> impl Future<Output = Result<Vec<RawStation>, FetchError>> + Send {
        CityBikesClient::fetch_current_state(self)
    }
}

impl StationFeed for MockCityBikesClient {
    fn fetch_current_state(
        &self,
    ) -> impl Future<Output = Result<Vec<RawStation>, FetchError>> + Send {
        MockCityBikesClient::fetch_current_state(self)
    }
}

impl StationFeed for Feed {
    fn fetch_current_state(
        &self,
    ) -> impl Future<Output = Result<Vec<RawStation>, FetchError>> + Send {
        Feed::fetch_current_state(self)
    }
}

/// Fetches the network state and appends it to the store.
#[derive(Debug, Clone)]
pub struct IngestionCycle<F> {
    feed: F,
    store: SnapshotStore,
}

impl<F: StationFeed> IngestionCycle<F> {
    pub fn new(feed: F, store: SnapshotStore) -> Self {
        Self { feed, store }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one full cycle.
    ///
    /// A successful fetch followed by a failed write is still a failure.
    /// The write runs on the blocking pool.
    pub async fn run_once(&self) -> Result<CycleReport, CycleError> {
        let stations = self.feed.fetch_current_state().await?;
        let snapshot_time = SnapshotTime::now();
        debug!(stations = stations.len(), %snapshot_time, "fetched network state");

        let records = normalize_stations(stations, snapshot_time);
        if records.is_empty() {
            warn!("feed returned no stations; nothing to insert");
        }

        let store = self.store.clone();
        let inserted = tokio::task::spawn_blocking(move || store.append(&records))
            .await
            .map_err(StoreError::from)??;

        Ok(CycleReport {
            snapshot_time,
            inserted,
        })
    }
}
