//! Time-boxed caching of dashboard queries.
//!
//! The pipeline itself never caches. This layer sits in front of the two
//! read operations for the HTTP API so that page refreshes do not hit
//! SQLite every time. The latest snapshot only changes once per poll, the
//! ranking moves much slower, so each gets its own cache and TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::analysis::RankingAnalyzer;
use crate::domain::{NetworkSummary, RankingEntry, StationSnapshot};
use crate::store::{SnapshotStore, StoreError};

/// Rows and totals for the most recent cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestView {
    pub summary: Option<NetworkSummary>,
    pub stations: Vec<StationSnapshot>,
}

/// Errors from a cached query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The blocking read task panicked or was cancelled
    #[error("query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the latest-snapshot view.
    pub latest_ttl: Duration,

    /// TTL for rankings.
    pub ranking_ttl: Duration,

    /// Maximum number of cached rankings (one per distinct limit).
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            latest_ttl: Duration::from_secs(300),
            ranking_ttl: Duration::from_secs(60 * 60),
            max_capacity: 64,
        }
    }
}

/// Read operations with caching.
///
/// Wraps the store and analyzer; reads run on the blocking pool.
pub struct CachedQueries {
    store: SnapshotStore,
    analyzer: RankingAnalyzer,

    /// At most one entry.
    latest: MokaCache<(), Arc<LatestView>>,

    /// Rankings keyed by limit.
    rankings: MokaCache<usize, Arc<Vec<RankingEntry>>>,
}

impl CachedQueries {
    pub fn new(store: SnapshotStore, analyzer: RankingAnalyzer, config: &CacheConfig) -> Self {
        let latest = MokaCache::builder()
            .time_to_live(config.latest_ttl)
            .max_capacity(1)
            .build();
        let rankings = MokaCache::builder()
            .time_to_live(config.ranking_ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            store,
            analyzer,
            latest,
            rankings,
        }
    }

    /// The latest cycle's rows and totals, cached.
    pub async fn latest(&self) -> Result<Arc<LatestView>, QueryError> {
        if let Some(view) = self.latest.get(&()).await {
            return Ok(view);
        }

        // One read, so the totals always describe the rows served with them.
        let store = self.store.clone();
        let stations = tokio::task::spawn_blocking(move || store.read_latest()).await??;
        let view = LatestView {
            summary: NetworkSummary::from_cycle(&stations),
            stations,
        };

        let view = Arc::new(view);
        self.latest.insert((), view.clone()).await;
        Ok(view)
    }

    /// The top `limit` stations, cached per limit.
    pub async fn ranking(&self, limit: usize) -> Result<Arc<Vec<RankingEntry>>, QueryError> {
        if let Some(entries) = self.rankings.get(&limit).await {
            return Ok(entries);
        }

        let analyzer = self.analyzer.clone();
        let entries =
            tokio::task::spawn_blocking(move || analyzer.compute_ranking(limit)).await??;

        let entries = Arc::new(entries);
        self.rankings.insert(limit, entries.clone()).await;
        Ok(entries)
    }

    /// Drop every cached result (after new data has been written).
    pub fn invalidate_all(&self) {
        self.latest.invalidate_all();
        self.rankings.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SnapshotTime;

    fn setup(config: &CacheConfig) -> (tempfile::TempDir, SnapshotStore, CachedQueries) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("bikes.db"));
        let queries = CachedQueries::new(store.clone(), RankingAnalyzer::new(store.clone()), config);
        (dir, store, queries)
    }

    fn row(id: &str, bikes: u32) -> StationSnapshot {
        StationSnapshot {
            snapshot_time: SnapshotTime::now(),
            station_id: Some(id.into()),
            name: Some(id.into()),
            num_bikes_available: Some(bikes),
            num_docks_available: Some(10 - bikes),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.latest_ttl, Duration::from_secs(300));
        assert_eq!(config.ranking_ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 64);
    }

    #[tokio::test]
    async fn serves_cached_result_until_invalidated() {
        let (_dir, store, queries) = setup(&CacheConfig::default());

        assert!(queries.ranking(10).await.unwrap().is_empty());
        assert!(queries.latest().await.unwrap().stations.is_empty());

        store.append(&[row("a", 4)]).unwrap();

        // Still the cached (empty) answers
        assert!(queries.ranking(10).await.unwrap().is_empty());
        assert!(queries.latest().await.unwrap().summary.is_none());

        queries.invalidate_all();

        assert_eq!(queries.ranking(10).await.unwrap().len(), 1);
        let latest = queries.latest().await.unwrap();
        assert_eq!(latest.stations.len(), 1);
        assert_eq!(latest.summary.as_ref().unwrap().total_bikes, 4);
    }

    #[tokio::test]
    async fn latest_summary_describes_served_rows_during_writes() {
        let (_dir, store, queries) = setup(&CacheConfig::default());
        store.append(&[row("a", 1), row("b", 2)]).unwrap();

        let writer_store = store.clone();
        let writer = std::thread::spawn(move || {
            for i in 0..300u32 {
                let t = SnapshotTime::now();
                let mut batch = vec![row("a", i % 10), row("b", (i + 3) % 10)];
                for r in &mut batch {
                    r.snapshot_time = t;
                }
                writer_store.append(&batch).unwrap();
            }
        });

        for _ in 0..300 {
            queries.invalidate_all();
            let view = queries.latest().await.unwrap();
            let summary = view.summary.as_ref().unwrap();

            assert_eq!(summary.station_count, view.stations.len() as u64);
            assert!(view.stations.iter().all(|r| r.snapshot_time == summary.snapshot_time));
            let bikes: i64 = view
                .stations
                .iter()
                .filter_map(|r| r.num_bikes_available)
                .map(i64::from)
                .sum();
            assert_eq!(summary.total_bikes, bikes);
        }

        writer.join().unwrap();
    }

    #[tokio::test]
    async fn ranking_is_cached_per_limit() {
        let (_dir, store, queries) = setup(&CacheConfig::default());
        store.append(&[row("a", 1), row("b", 2), row("c", 3)]).unwrap();

        assert_eq!(queries.ranking(1).await.unwrap().len(), 1);
        assert_eq!(queries.ranking(3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn entries_expire_after_their_ttl() {
        let config = CacheConfig {
            latest_ttl: Duration::from_millis(50),
            ranking_ttl: Duration::from_secs(3600),
            max_capacity: 16,
        };
        let (_dir, store, queries) = setup(&config);

        assert!(queries.latest().await.unwrap().stations.is_empty());
        assert!(queries.ranking(10).await.unwrap().is_empty());
        store.append(&[row("a", 4)]).unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        // Latest has expired, ranking has not
        assert_eq!(queries.latest().await.unwrap().stations.len(), 1);
        assert!(queries.ranking(10).await.unwrap().is_empty());
    }
}
