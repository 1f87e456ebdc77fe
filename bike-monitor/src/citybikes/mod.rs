//! CityBikes API client.
//!
//! CityBikes (<https://api.citybik.es>) aggregates live availability for
//! hundreds of bike-share systems behind one schema. We poll a single
//! network document and only read the station list out of it.
//!
//! Key characteristics of the feed:
//! - Station `id`s are stable hashes, recurring on every poll
//! - `free_bikes` / `empty_slots` are the live counts; either may be missing
//! - No authentication and no documented rate limit

mod client;
mod convert;
mod error;
mod feed;
mod mock;
mod types;

pub use client::{CityBikesClient, CityBikesConfig, DEFAULT_API_URL};
pub use convert::normalize_stations;
pub use error::FetchError;
pub use feed::Feed;
pub use mock::MockCityBikesClient;
pub use types::{Network, NetworkResponse, RawStation};
