//! Station observations.

use serde::Serialize;

use super::time::SnapshotTime;

/// One observation of one station, as written by an ingestion cycle.
///
/// Every field except `snapshot_time` comes from the upstream feed and may
/// be missing there, so they are all optional. Coordinates are repeated on
/// every row rather than kept in a separate station table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSnapshot {
    /// When the cycle that produced this row ran.
    pub snapshot_time: SnapshotTime,

    /// Upstream station identifier. Recurs in every cycle.
    pub station_id: Option<String>,

    /// Human-readable station name.
    pub name: Option<String>,

    /// Bikes ready to be rented.
    pub num_bikes_available: Option<u32>,

    /// Empty docks a bike could be returned to.
    pub num_docks_available: Option<u32>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,
}

impl StationSnapshot {
    /// Total capacity seen at this instant (bikes plus empty docks).
    ///
    /// Returns `None` when either count is missing.
    pub fn capacity(&self) -> Option<u32> {
        Some(
            self.num_bikes_available?
                .saturating_add(self.num_docks_available?),
        )
    }

    /// Share of capacity occupied by bikes, as a percentage.
    ///
    /// Returns `None` when either count is missing or the station reports
    /// zero capacity.
    pub fn utilization_percent(&self) -> Option<f64> {
        let capacity = self.capacity()?;
        if capacity == 0 {
            return None;
        }
        Some(f64::from(self.num_bikes_available?) / f64::from(capacity) * 100.0)
    }
}
