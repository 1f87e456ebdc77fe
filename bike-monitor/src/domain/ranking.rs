//! Derived, non-persisted views over the snapshot history.

use serde::Serialize;

use super::snapshot::StationSnapshot;
use super::time::SnapshotTime;

/// Default number of stations in a ranking.
pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// Aggregate statistics for one `(station_id, name)` group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub station_id: Option<String>,

    pub name: Option<String>,

    /// Number of snapshots in the group.
    pub snapshot_count: u64,

    /// Sum of available bikes over the group. Missing counts contribute 0.
    pub total_bikes: i64,

    /// Mean available bikes. `None` if every count in the group is missing.
    pub avg_bikes: Option<f64>,

    /// Mean of bikes / (bikes + docks) as a percentage, rounded to two
    /// decimals. Rows with zero or unknown capacity are left out; `None` if
    /// no row qualifies.
    pub avg_utilization_percent: Option<f64>,
}

/// Network-wide totals for the most recent cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSummary {
    pub snapshot_time: SnapshotTime,

    /// Number of stations reported in the cycle.
    pub station_count: u64,

    pub total_bikes: i64,

    pub total_docks: i64,
}

impl NetworkSummary {
    /// Totals over the rows of a single cycle.
    ///
    /// Returns `None` for an empty slice. The timestamp is taken from the
    /// first row; missing counts contribute 0.
    pub fn from_cycle(rows: &[StationSnapshot]) -> Option<Self> {
        let first = rows.first()?;

        Some(Self {
            snapshot_time: first.snapshot_time,
            station_count: rows.len() as u64,
            total_bikes: rows
                .iter()
                .filter_map(|r| r.num_bikes_available)
                .map(i64::from)
                .sum(),
            total_docks: rows
                .iter()
                .filter_map(|r| r.num_docks_available)
                .map(i64::from)
                .sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(t: SnapshotTime, bikes: Option<u32>, docks: Option<u32>) -> StationSnapshot {
        StationSnapshot {
            snapshot_time: t,
            station_id: None,
            name: None,
            num_bikes_available: bikes,
            num_docks_available: docks,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn summary_of_empty_cycle_is_none() {
        assert_eq!(NetworkSummary::from_cycle(&[]), None);
    }

    #[test]
    fn summary_totals_skip_missing_counts() {
        let t = SnapshotTime::parse("2024-03-15T10:00:00Z").unwrap();
        let rows = [
            row(t, Some(5), Some(5)),
            row(t, None, Some(3)),
            row(t, Some(2), None),
        ];

        let summary = NetworkSummary::from_cycle(&rows).unwrap();

        assert_eq!(summary.snapshot_time, t);
        assert_eq!(summary.station_count, 3);
        assert_eq!(summary.total_bikes, 7);
        assert_eq!(summary.total_docks, 8);
    }
}
