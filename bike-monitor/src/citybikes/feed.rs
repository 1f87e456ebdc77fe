//! Runtime choice between the live API and the file-backed mock.

use std::fmt;

use super::client::CityBikesClient;
use super::error::FetchError;
use super::mock::MockCityBikesClient;
use super::types::RawStation;

/// The station source selected at startup.
#[derive(Debug, Clone)]
pub enum Feed {
    Live(CityBikesClient),
    Mock(MockCityBikesClient),
}

impl Feed {
    /// Fetch the current station list from whichever source is active.
    pub async fn fetch_current_state(&self) -> Result<Vec<RawStation>, FetchError> {
        match self {
            Feed::Live(client) => client.fetch_current_state().await,
            Feed::Mock(client) => client.fetch_current_state().await,
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Live(client) => write!(f, "{}", client.api_url()),
            Feed::Mock(client) => write!(f, "mock:{}", client.path().display()),
        }
    }
}
