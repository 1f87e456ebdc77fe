//! Mock CityBikes client for working without network access.
//!
//! Loads a saved network response from a JSON file and serves it as if
//! it were the live API.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::FetchError;
use super::types::{NetworkResponse, RawStation};

/// Mock client that serves a network document from disk.
#[derive(Debug, Clone)]
pub struct MockCityBikesClient {
    path: PathBuf,
    stations: Arc<RwLock<Vec<RawStation>>>,
}

impl MockCityBikesClient {
    /// Create a mock client from a saved `GET /v2/networks/{id}` body.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref().to_path_buf();
        let stations = load(&path)?;

        Ok(Self {
            path,
            stations: Arc::new(RwLock::new(stations)),
        })
    }

    /// Return the loaded stations.
    ///
    /// Mimics `CityBikesClient::fetch_current_state`. The data is static
    /// between reloads.
    pub async fn fetch_current_state(&self) -> Result<Vec<RawStation>, FetchError> {
        Ok(self.stations.read().await.clone())
    }

    /// Re-read the file (useful while editing mock data).
    pub async fn reload(&self) -> Result<usize, FetchError> {
        let fresh = load(&self.path)?;
        let count = fresh.len();
        *self.stations.write().await = fresh;
        Ok(count)
    }

    /// The file this client serves.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load(path: &Path) -> Result<Vec<RawStation>, FetchError> {
    let json = std::fs::read_to_string(path).map_err(|e| FetchError::MockData {
        message: format!("failed to read {}: {e}", path.display()),
    })?;

    let network: NetworkResponse =
        serde_json::from_str(&json).map_err(|e| FetchError::MockData {
            message: format!("failed to parse {}: {e}", path.display()),
        })?;

    Ok(network.into_stations())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/mock_network.json");

    #[tokio::test]
    async fn load_mock_data() {
        let client = MockCityBikesClient::new(MOCK_FILE).unwrap();
        let stations = client.fetch_current_state().await.unwrap();

        assert!(!stations.is_empty());
        assert!(stations.iter().all(|s| s.id.is_some()));
    }

    #[tokio::test]
    async fn reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        std::fs::write(&path, r#"{"network": {"stations": [{"id": "a"}]}}"#).unwrap();

        let client = MockCityBikesClient::new(&path).unwrap();
        assert_eq!(client.fetch_current_state().await.unwrap().len(), 1);

        std::fs::write(&path, r#"{"network": {"stations": [{"id": "a"}, {"id": "b"}]}}"#).unwrap();
        assert_eq!(client.reload().await.unwrap(), 2);
        assert_eq!(client.fetch_current_state().await.unwrap().len(), 2);
    }

    #[test]
    fn missing_file_is_error() {
        let err = MockCityBikesClient::new("does/not/exist.json").unwrap_err();
        assert!(matches!(err, FetchError::MockData { .. }));
    }
}
