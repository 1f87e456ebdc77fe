//! Persistent snapshot storage.
//!
//! One SQLite table, `station_status`, holding one row per station per
//! cycle. Rows are only ever inserted.

mod error;
mod sqlite;

pub use error::StoreError;
pub use sqlite::SnapshotStore;
