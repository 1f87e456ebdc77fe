//! Utilization ranking over the full snapshot history.
//!
//! Stations are grouped by `(station_id, name)` and ordered by mean
//! available bikes, highest first. Ties are broken by `station_id` then
//! `name`, ascending; groups with no known bike count sort last.
//!
//! Utilization is `bikes / (bikes + docks)` per row, averaged per group.
//! A row whose capacity is zero or unknown has no defined ratio and is left
//! out of that average rather than counted as 0%.

use rusqlite::{OptionalExtension, Row, params};

use crate::domain::{NetworkSummary, RankingEntry};
use crate::store::{SnapshotStore, StoreError};

const SQL_RANKING: &str = "
    SELECT
        station_id,
        name,
        COUNT(*) AS snapshot_count,
        COALESCE(SUM(num_bikes_available), 0) AS total_bikes,
        AVG(num_bikes_available) AS avg_bikes,
        ROUND(
            AVG(CAST(num_bikes_available AS REAL)
                / NULLIF(num_bikes_available + num_docks_available, 0)) * 100,
            2
        ) AS avg_utilization_percent
    FROM station_status
    GROUP BY station_id, name
    ORDER BY avg_bikes IS NULL, avg_bikes DESC, station_id ASC, name ASC
    LIMIT ?1";

const SQL_LATEST_SUMMARY: &str = "
    SELECT
        snapshot_time,
        COUNT(*),
        COALESCE(SUM(num_bikes_available), 0),
        COALESCE(SUM(num_docks_available), 0)
    FROM station_status
    WHERE snapshot_time = (SELECT MAX(snapshot_time) FROM station_status)
    GROUP BY snapshot_time";

/// Runs aggregate queries against a snapshot store.
#[derive(Debug, Clone)]
pub struct RankingAnalyzer {
    store: SnapshotStore,
}

impl RankingAnalyzer {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// Top `limit` stations by mean available bikes.
    ///
    /// Returns an empty list for an empty store or a zero limit.
    pub fn compute_ranking(&self, limit: usize) -> Result<Vec<RankingEntry>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.store.with_connection(|conn| {
            let mut stmt = conn.prepare(SQL_RANKING)?;
            let rows = stmt.query_map(params![limit], entry_from_row)?;
            rows.collect()
        })
    }

    /// Headline totals for the most recent cycle, if any.
    pub fn summarize_latest(&self) -> Result<Option<NetworkSummary>, StoreError> {
        self.store.with_connection(|conn| {
            conn.query_row(SQL_LATEST_SUMMARY, [], |row| {
                Ok(NetworkSummary {
                    snapshot_time: row.get(0)?,
                    station_count: row.get::<_, i64>(1)? as u64,
                    total_bikes: row.get(2)?,
                    total_docks: row.get(3)?,
                })
            })
            .optional()
        })
    }
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<RankingEntry> {
    Ok(RankingEntry {
        station_id: row.get(0)?,
        name: row.get(1)?,
        snapshot_count: row.get::<_, i64>(2)? as u64,
        total_bikes: row.get(3)?,
        avg_bikes: row.get(4)?,
        avg_utilization_percent: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_RANKING_LIMIT, SnapshotTime, StationSnapshot};

    fn setup() -> (tempfile::TempDir, SnapshotStore, RankingAnalyzer) {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("bikes.db"));
        let analyzer = RankingAnalyzer::new(store.clone());
        (dir, store, analyzer)
    }

    fn at(minute: u32) -> SnapshotTime {
        SnapshotTime::parse(&format!("2024-03-15T10:{minute:02}:00Z")).unwrap()
    }

    fn row(t: SnapshotTime, id: &str, bikes: Option<u32>, docks: Option<u32>) -> StationSnapshot {
        StationSnapshot {
            snapshot_time: t,
            station_id: Some(id.to_string()),
            name: Some(format!("Station {id}")),
            num_bikes_available: bikes,
            num_docks_available: docks,
            latitude: None,
            longitude: None,
        }
    }

    fn entry<'a>(ranking: &'a [RankingEntry], id: &str) -> &'a RankingEntry {
        ranking
            .iter()
            .find(|e| e.station_id.as_deref() == Some(id))
            .unwrap()
    }

    #[test]
    fn empty_store_gives_empty_ranking() {
        let (_dir, _store, analyzer) = setup();

        assert!(analyzer.compute_ranking(DEFAULT_RANKING_LIMIT).unwrap().is_empty());
        assert_eq!(analyzer.summarize_latest().unwrap(), None);
    }

    #[test]
    fn averages_over_history() {
        let (_dir, store, analyzer) = setup();
        store.append(&[row(at(0), "S1", Some(5), Some(5))]).unwrap();
        store.append(&[row(at(5), "S1", Some(7), Some(3))]).unwrap();

        let ranking = analyzer.compute_ranking(10).unwrap();

        assert_eq!(
            ranking,
            vec![RankingEntry {
                station_id: Some("S1".into()),
                name: Some("Station S1".into()),
                snapshot_count: 2,
                total_bikes: 12,
                avg_bikes: Some(6.0),
                avg_utilization_percent: Some(60.0),
            }]
        );
    }

    #[test]
    fn zero_capacity_rows_are_skipped_in_utilization() {
        let (_dir, store, analyzer) = setup();
        store
            .append(&[row(at(0), "S1", Some(0), Some(0)), row(at(0), "S2", Some(0), Some(0))])
            .unwrap();
        store.append(&[row(at(5), "S1", Some(5), Some(5))]).unwrap();

        let ranking = analyzer.compute_ranking(10).unwrap();

        let s1 = entry(&ranking, "S1");
        assert_eq!(s1.snapshot_count, 2);
        assert_eq!(s1.avg_bikes, Some(2.5));
        assert_eq!(s1.avg_utilization_percent, Some(50.0));

        let s2 = entry(&ranking, "S2");
        assert_eq!(s2.avg_bikes, Some(0.0));
        assert_eq!(s2.avg_utilization_percent, None);
    }

    #[test]
    fn missing_counts_are_ignored() {
        let (_dir, store, analyzer) = setup();
        store
            .append(&[
                row(at(0), "S1", None, None),
                row(at(1), "S1", Some(4), None),
                row(at(2), "S1", Some(2), Some(2)),
                row(at(3), "S2", None, Some(10)),
            ])
            .unwrap();

        let ranking = analyzer.compute_ranking(10).unwrap();

        let s1 = entry(&ranking, "S1");
        assert_eq!(s1.snapshot_count, 3);
        assert_eq!(s1.total_bikes, 6);
        assert_eq!(s1.avg_bikes, Some(3.0));
        assert_eq!(s1.avg_utilization_percent, Some(50.0));

        let s2 = entry(&ranking, "S2");
        assert_eq!(s2.total_bikes, 0);
        assert_eq!(s2.avg_bikes, None);
        assert_eq!(s2.avg_utilization_percent, None);

        // No known bike count sorts after everything else
        assert_eq!(ranking.last().unwrap().station_id.as_deref(), Some("S2"));
    }

    #[test]
    fn utilization_is_rounded_to_two_decimals() {
        let (_dir, store, analyzer) = setup();
        store.append(&[row(at(0), "S1", Some(1), Some(2))]).unwrap();

        let ranking = analyzer.compute_ranking(10).unwrap();

        assert_eq!(ranking[0].avg_utilization_percent, Some(33.33));
    }

    #[test]
    fn orders_by_avg_bikes_then_station_id() {
        let (_dir, store, analyzer) = setup();
        store
            .append(&[
                row(at(0), "B", Some(3), Some(7)),
                row(at(0), "A", Some(3), Some(1)),
                row(at(0), "C", Some(9), Some(1)),
                row(at(0), "D", Some(1), Some(9)),
            ])
            .unwrap();

        let ids: Vec<_> = analyzer
            .compute_ranking(10)
            .unwrap()
            .into_iter()
            .map(|e| e.station_id.unwrap())
            .collect();

        assert_eq!(ids, ["C", "A", "B", "D"]);
    }

    #[test]
    fn renamed_station_is_a_separate_group() {
        let (_dir, store, analyzer) = setup();
        let mut renamed = row(at(5), "S1", Some(1), Some(1));
        renamed.name = Some("New name".into());
        store.append(&[row(at(0), "S1", Some(1), Some(1))]).unwrap();
        store.append(&[renamed]).unwrap();

        let ranking = analyzer.compute_ranking(10).unwrap();

        assert_eq!(ranking.len(), 2);
        assert!(ranking.iter().all(|e| e.snapshot_count == 1));
    }

    #[test]
    fn limit_caps_results() {
        let (_dir, store, analyzer) = setup();
        let rows: Vec<_> = (0..15u32)
            .map(|i| row(at(0), &format!("S{i:02}"), Some(i), Some(20 - i)))
            .collect();
        store.append(&rows).unwrap();

        assert_eq!(analyzer.compute_ranking(DEFAULT_RANKING_LIMIT).unwrap().len(), 10);
        assert_eq!(analyzer.compute_ranking(3).unwrap().len(), 3);
        assert_eq!(analyzer.compute_ranking(100).unwrap().len(), 15);
        assert!(analyzer.compute_ranking(0).unwrap().is_empty());
    }

    #[test]
    fn summary_covers_latest_cycle_only() {
        let (_dir, store, analyzer) = setup();
        store
            .append(&[row(at(0), "S1", Some(100), Some(100))])
            .unwrap();
        store
            .append(&[
                row(at(5), "S1", Some(2), Some(8)),
                row(at(5), "S2", Some(3), None),
            ])
            .unwrap();

        let summary = analyzer.summarize_latest().unwrap().unwrap();

        assert_eq!(summary.snapshot_time, at(5));
        assert_eq!(summary.station_count, 2);
        assert_eq!(summary.total_bikes, 5);
        assert_eq!(summary.total_docks, 8);
    }
}
