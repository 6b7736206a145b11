//! HTTP client for the OpenWeatherMap current weather endpoint.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::ProviderConfig;

use super::{ProviderError, Reading};

/// A successfully fetched payload along with its decoded reading.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    pub raw: Value,
    pub reading: Reading,
}

/// Client for the weather provider.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct OwmClient {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    api_key: String,
}

impl OwmClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            latitude: config.latitude,
            longitude: config.longitude,
            api_key: config.api_key.clone(),
        })
    }

    /// Fetch and decode the current weather.
    pub async fn fetch(&self) -> Result<FetchedPayload, ProviderError> {
        debug!(
            url = %self.base_url,
            lat = self.latitude,
            lon = self.longitude,
            "Fetching weather data"
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", self.latitude.to_string()),
                ("lon", self.longitude.to_string()),
                ("APPID", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, &body));
        }

        let text = response.text().await?;
        let raw: Value =
            serde_json::from_str(&text).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let reading = Reading::from_payload(&raw)?;

        Ok(FetchedPayload { raw, reading })
    }
}

impl std::fmt::Debug for OwmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwmClient")
            .field("base_url", &self.base_url)
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .finish_non_exhaustive()
    }
}
