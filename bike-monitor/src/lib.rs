//! Bike-share availability monitor.
//!
//! Polls a CityBikes network on a fixed interval, appends every station's
//! state to a SQLite history, and ranks stations by how full they run.

pub mod analysis;
pub mod cache;
pub mod citybikes;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod web;
