//! CityBikes API response DTOs.
//!
//! These map directly onto the `GET /v2/networks/{id}` JSON body. The feed
//! is aggregated from many operators and any field can be missing, so
//! everything is optional and unknown fields are ignored.

use serde::Deserialize;

/// Top-level response: `{ "network": { ... } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkResponse {
    pub network: Option<Network>,
}

impl NetworkResponse {
    /// The station list, or an empty list if `network` or `stations` is
    /// absent.
    pub fn into_stations(self) -> Vec<RawStation> {
        self.network
            .and_then(|n| n.stations)
            .unwrap_or_default()
    }
}

/// A bike-share network. Only the station list is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Network {
    pub stations: Option<Vec<RawStation>>,
}

/// One station as reported by the feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawStation {
    /// Opaque station hash.
    pub id: Option<String>,

    pub name: Option<String>,

    /// Bikes available for rent.
    pub free_bikes: Option<u32>,

    /// Empty docks.
    pub empty_slots: Option<u32>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,
}
