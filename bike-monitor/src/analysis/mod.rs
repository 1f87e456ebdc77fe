//! Read-side analysis over stored snapshots.

mod ranking;

pub use ranking::RankingAnalyzer;
