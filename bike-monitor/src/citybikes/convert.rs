//! Conversion from CityBikes DTOs to domain snapshots.

use crate::domain::{SnapshotTime, StationSnapshot};

use super::types::RawStation;

/// Stamp a batch of raw stations with one cycle timestamp.
///
/// Absent fields stay absent; nothing here can fail.
pub fn normalize_stations(
    stations: Vec<RawStation>,
    snapshot_time: SnapshotTime,
) -> Vec<StationSnapshot> {
    stations
        .into_iter()
        .map(|raw| StationSnapshot {
            snapshot_time,
            station_id: raw.id,
            name: raw.name,
            num_bikes_available: raw.free_bikes,
            num_docks_available: raw.empty_slots,
            latitude: raw.latitude,
            longitude: raw.longitude,
        })
        .collect()
}
