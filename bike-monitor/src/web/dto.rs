//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::cache::LatestView;
use crate::domain::{NetworkSummary, RankingEntry, SnapshotTime, StationSnapshot};
use crate::ingest::CycleReport;

/// Query string for the ranking endpoint.
#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    /// Number of stations to return (defaults to 10, capped at 100)
    pub limit: Option<usize>,
}

/// One station in the latest snapshot.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub station_id: Option<String>,
    pub name: Option<String>,
    pub num_bikes_available: Option<u32>,
    pub num_docks_available: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// bikes / (bikes + docks) at this instant, as a percentage
    pub utilization_percent: Option<f64>,
}

/// Response for the latest-snapshot endpoint.
#[derive(Debug, Serialize)]
pub struct LatestResponse {
    /// Totals for the cycle; `null` until the first cycle has run
    pub summary: Option<NetworkSummary>,

    pub stations: Vec<StationResult>,
}

/// Response for the ranking endpoint.
#[derive(Debug, Serialize)]
pub struct RankingResponse {
    /// Limit actually applied
    pub limit: usize,

    /// Stations, best first
    pub entries: Vec<RankingEntry>,
}

/// Response for an on-demand ingestion.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub snapshot_time: SnapshotTime,
    pub inserted: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl StationResult {
    /// Create from a stored snapshot.
    pub fn from_snapshot(s: &StationSnapshot) -> Self {
        Self {
            station_id: s.station_id.clone(),
            name: s.name.clone(),
            num_bikes_available: s.num_bikes_available,
            num_docks_available: s.num_docks_available,
            latitude: s.latitude,
            longitude: s.longitude,
            utilization_percent: s.utilization_percent(),
        }
    }
}

impl LatestResponse {
    pub fn from_view(view: &LatestView) -> Self {
        Self {
            summary: view.summary.clone(),
            stations: view.stations.iter().map(StationResult::from_snapshot).collect(),
        }
    }
}

impl From<CycleReport> for IngestResponse {
    fn from(report: CycleReport) -> Self {
        Self {
            snapshot_time: report.snapshot_time,
            inserted: report.inserted,
        }
    }
}
