//! SQLite-backed snapshot table.
//!
//! A connection is opened for every operation and dropped before the
//! operation returns, so nothing holds the database between calls. Writes
//! go through a single transaction per batch; if anything fails the
//! transaction is dropped uncommitted and SQLite rolls it back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Row, params};
use tracing::debug;

use crate::domain::{SnapshotTime, StationSnapshot};

use super::error::StoreError;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SQL_CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS station_status (
        snapshot_time TEXT,
        station_id TEXT,
        name TEXT,
        num_bikes_available INTEGER,
        num_docks_available INTEGER,
        latitude REAL,
        longitude REAL
    );

    CREATE INDEX IF NOT EXISTS idx_station_status_snapshot_time
        ON station_status(snapshot_time);
";

const SQL_INSERT: &str = "INSERT INTO station_status (
        snapshot_time, station_id, name,
        num_bikes_available, num_docks_available,
        latitude, longitude
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const SQL_SELECT_LATEST: &str = "
    SELECT snapshot_time, station_id, name,
           num_bikes_available, num_docks_available,
           latitude, longitude
    FROM station_status
    WHERE snapshot_time = (SELECT MAX(snapshot_time) FROM station_status)
    ORDER BY rowid";

/// Append-only store of station snapshots.
///
/// Cheap to clone: it only remembers where the database lives.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the SQLite file at `path`.
    ///
    /// Nothing is touched on disk until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the snapshot table if it does not exist yet.
    ///
    /// Idempotent; every other operation calls it implicitly.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.connect().map(drop)
    }

    /// Write a batch of snapshots in one transaction.
    ///
    /// Either every row is persisted or none is. An empty batch succeeds
    /// without opening the database. Returns the number of rows written.
    pub fn append(&self, records: &[StationSnapshot]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(SQL_INSERT)?;
            for r in records {
                stmt.execute(params![
                    r.snapshot_time,
                    r.station_id,
                    r.name,
                    r.num_bikes_available,
                    r.num_docks_available,
                    r.latitude,
                    r.longitude,
                ])?;
            }
        }
        tx.commit()?;

        debug!(rows = records.len(), db = %self.path.display(), "appended snapshot batch");
        Ok(records.len())
    }

    /// All rows from the most recent cycle, in insertion order.
    ///
    /// Empty if the store holds no rows.
    pub fn read_latest(&self) -> Result<Vec<StationSnapshot>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(SQL_SELECT_LATEST)?;
            let rows = stmt.query_map([], snapshot_from_row)?;
            rows.collect()
        })
    }

    /// Total number of stored rows across all cycles.
    pub fn count(&self) -> Result<u64, StoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM station_status", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .map(|n| n as u64)
    }

    /// Run a read against a fresh connection.
    ///
    /// Used by the analyzer to issue its own aggregate queries.
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self.connect()?;
        Ok(f(&conn)?)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL lets dashboard reads proceed while a cycle is writing.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SQL_CREATE_TABLE)?;
        Ok(conn)
    }
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<StationSnapshot> {
    Ok(StationSnapshot {
        snapshot_time: row.get(0)?,
        station_id: row.get(1)?,
        name: row.get(2)?,
        num_bikes_available: row.get(3)?,
        num_docks_available: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
    })
}

impl ToSql for SnapshotTime {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_storage_string()))
    }
}

impl FromSql for SnapshotTime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        SnapshotTime::parse(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
