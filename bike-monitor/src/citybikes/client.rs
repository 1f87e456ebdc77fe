//! CityBikes HTTP client.
//!
//! Makes exactly one request per call. There is no retry and, unless the
//! config sets one, no request timeout beyond the transport defaults.

use std::time::Duration;

use super::error::FetchError;
use super::types::{NetworkResponse, RawStation};

/// Default endpoint: the Bordeaux V3 network.
pub const DEFAULT_API_URL: &str = "https://api.citybik.es/v2/networks/v3-bordeaux";

/// How much of an error or undecodable body to keep for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// Configuration for the CityBikes client.
#[derive(Debug, Clone)]
pub struct CityBikesConfig {
    /// Full URL of the network endpoint
    pub api_url: String,
    /// Optional request timeout
    pub timeout: Option<Duration>,
}

impl CityBikesConfig {
    /// Create a config for the given endpoint.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: None,
        }
    }

    /// Set a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for CityBikesConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Client for a single CityBikes network endpoint.
#[derive(Debug, Clone)]
pub struct CityBikesClient {
    http: reqwest::Client,
    api_url: String,
}

impl CityBikesClient {
    /// Create a new client.
    pub fn new(config: CityBikesConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_url: config.api_url,
        })
    }

    /// The endpoint this client polls.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch and decode the full network document.
    pub async fn fetch_network(&self) -> Result<NetworkResponse, FetchError> {
        let response = self.http.get(&self.api_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: snippet(&body),
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            message: e.to_string(),
            body: Some(snippet(&body)),
        })
    }

    /// Fetch the current station list.
    ///
    /// A document without `network` or `stations` yields an empty list.
    pub async fn fetch_current_state(&self) -> Result<Vec<RawStation>, FetchError> {
        let network = self.fetch_network().await?;
        Ok(network.into_stations())
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
