//! Cycle timestamps.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Error returned when a stored timestamp cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid snapshot time {input:?}: {reason}")]
pub struct InvalidSnapshotTime {
    input: String,
    reason: String,
}

/// The instant an ingestion cycle observed the network.
///
/// Every row written by one cycle carries the same `SnapshotTime`, so the
/// most recent cycle can be selected with `MAX(snapshot_time)`.
///
/// The storage form is RFC 3339 in UTC with a fixed nine-digit fraction,
/// which makes lexical order match chronological order and round-trips
/// without losing precision.
///
/// # Examples
///
/// ```
/// use bike_monitor::domain::SnapshotTime;
///
/// let t = SnapshotTime::parse("2024-03-15T10:00:00.000000000Z").unwrap();
/// assert_eq!(t.to_storage_string(), "2024-03-15T10:00:00.000000000Z");
///
/// // Offsets are normalized to UTC
/// let local = SnapshotTime::parse("2024-03-15T11:00:00+01:00").unwrap();
/// assert_eq!(local, t);
///
/// assert!(SnapshotTime::parse("yesterday").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotTime(DateTime<Utc>);

impl SnapshotTime {
    /// Stamp the current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap an existing UTC instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC 3339 timestamp.
    pub fn parse(s: &str) -> Result<Self, InvalidSnapshotTime> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| InvalidSnapshotTime {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// The fixed-width text stored in the `snapshot_time` column.
    pub fn to_storage_string(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// The underlying UTC instant.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for SnapshotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage_string())
    }
}

impl Serialize for SnapshotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_storage_string())
    }
}
