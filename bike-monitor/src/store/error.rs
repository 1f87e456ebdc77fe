//! Snapshot store error types.

use std::path::PathBuf;

/// Errors raised at the storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The directory holding the database file could not be created
    #[error("failed to create database directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any SQLite failure: open, schema, write, read or row decoding
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The blocking task running the operation panicked or was cancelled
    #[error("storage worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
