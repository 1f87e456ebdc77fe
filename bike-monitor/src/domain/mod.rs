//! Core domain types for the bike-share monitor.
//!
//! These are independent of the upstream API representation and of the
//! storage layout.

mod ranking;
mod snapshot;
mod time;

pub use ranking::{DEFAULT_RANKING_LIMIT, NetworkSummary, RankingEntry};
pub use snapshot::StationSnapshot;
pub use time::{InvalidSnapshotTime, SnapshotTime};
