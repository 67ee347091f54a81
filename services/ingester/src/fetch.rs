//! HTTP client for the NDBC text feeds.

use reqwest::Client;
use tracing::{debug, instrument};

use ocean_common::{OceanError, OceanResult};

/// Fetches the NDBC plain-text feeds over unauthenticated HTTP GET.
///
/// Every request carries a bounded timeout; a timed-out or non-2xx
/// fetch fails that run before any write is attempted.
pub struct NdbcClient {
    client: Client,
    base_url: String,
}

impl NdbcClient {
    /// Create a client against a feed base URL (normally the public
    /// NDBC host; tests point it at a local server).
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the station metadata table.
    pub async fn station_table(&self) -> OceanResult<String> {
        self.fetch_text(&format!("{}/data/stations/station_table.txt", self.base_url))
            .await
    }

    /// Fetch the latest-observation-per-station feed.
    pub async fn latest_obs(&self) -> OceanResult<String> {
        self.fetch_text(&format!("{}/data/latest_obs/latest_obs.txt", self.base_url))
            .await
    }

    /// Fetch one station's ~45-day realtime history file.
    pub async fn station_realtime(&self, station_id: &str) -> OceanResult<String> {
        self.fetch_text(&format!("{}/data/realtime2/{}.txt", self.base_url, station_id))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_text(&self, url: &str) -> OceanResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                OceanError::Timeout
            } else {
                OceanError::FetchError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OceanError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| OceanError::FetchError(e.to_string()))?;

        debug!(bytes = text.len(), "Fetched feed");
        Ok(text)
    }
}
