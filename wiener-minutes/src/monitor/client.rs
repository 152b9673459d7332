//! Wiener Linien realtime monitor HTTP client.
//!
//! Fetches the monitor for one DIVA number and hands the payload to the
//! normalizer. Retrying is the caller's business: every failure is returned
//! as-is.

use std::time::Duration;

use chrono::Utc;
use reqwest::Url;
use tracing::{debug, warn};

use crate::domain::{DepartureRecord, Diva};

use super::DepartureSource;
use super::error::NetworkError;
use super::normalize::normalize;
use super::types::MonitorResponse;

/// Default monitor endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.wienerlinien.at/ogd_realtime/monitor";

/// Traffic-info annotations requested with every monitor call.
const TRAFFIC_INFO: [&str; 3] = ["stoerungkurz", "stoerunglang", "elevatorinfo"];

/// Default request timeout. Kept well below the 15 s polling floor so a hung
/// request never outlives the next tick.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the monitor client.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Monitor endpoint (defaults to production Wiener Linien)
    pub base_url: String,
    /// Optional CORS relay prefix; the encoded target URL is appended to it
    pub relay_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MonitorConfig {
    /// Create a config pointing at the production endpoint.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            relay_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing or a local proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Route requests through a relay, e.g. `https://corsproxy.io/?`.
    pub fn with_relay(mut self, relay: impl Into<String>) -> Self {
        self.relay_url = Some(relay.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Realtime monitor API client.
#[derive(Debug, Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    base_url: Url,
    relay_url: Option<String>,
}

impl MonitorClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MonitorConfig) -> Result<Self, NetworkError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            NetworkError::NotConfigured(format!("invalid base URL {}: {e}", config.base_url))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("wiener-minutes/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            relay_url: config.relay_url,
        })
    }

    /// The URL requested for a station, after relay wrapping.
    pub fn request_url(&self, diva: Diva) -> String {
        let mut target = self.base_url.clone();
        {
            let mut query = target.query_pairs_mut();
            query.append_pair("diva", &diva.to_string());
            for info in TRAFFIC_INFO {
                query.append_pair("activateTrafficInfo", info);
            }
        }

        match &self.relay_url {
            Some(relay) => format!("{relay}{}", urlencoding::encode(target.as_str())),
            None => target.into(),
        }
    }

    /// Fetch the raw monitor payload for a station.
    pub async fn get_monitor_raw(&self, diva: Diva) -> Result<MonitorResponse, NetworkError> {
        let url = self.request_url(diva);
        debug!(%diva, %url, "requesting monitor");

        let response = self.http.get(&url).send().await.inspect_err(|e| {
            warn!(%diva, error = %e, "monitor request failed");
        })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%diva, status = status.as_u16(), "monitor returned error status");
            return Err(NetworkError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!(%diva, error = %e, "monitor payload did not parse");
            NetworkError::parse(e, &body)
        })
    }

    /// Fetch a station's departures, flattened and sorted.
    pub async fn get_departures(&self, diva: Diva) -> Result<Vec<DepartureRecord>, NetworkError> {
        let raw = self.get_monitor_raw(diva).await?;
        let records = normalize(&raw, Utc::now());
        debug!(%diva, departures = records.len(), "monitor normalized");
        Ok(records)
    }
}

impl DepartureSource for MonitorClient {
    async fn fetch_departures(&self, diva: Diva) -> Result<Vec<DepartureRecord>, NetworkError> {
        self.get_departures(diva).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = MonitorConfig::new()
            .with_base_url("http://localhost:8080/monitor")
            .with_relay("https://relay.example/?")
            .with_timeout(5);

        assert_eq!(config.base_url, "http://localhost:8080/monitor");
        assert_eq!(config.relay_url.as_deref(), Some("https://relay.example/?"));
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = MonitorConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.relay_url, None);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn client_creation() {
        assert!(MonitorClient::new(MonitorConfig::new()).is_ok());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = MonitorClient::new(MonitorConfig::new().with_base_url("not a url"));
        assert!(matches!(result, Err(NetworkError::NotConfigured(_))));
    }

    #[test]
    fn request_url_carries_station_and_traffic_info() {
        let client = MonitorClient::new(MonitorConfig::new()).unwrap();

        assert_eq!(
            client.request_url(Diva::new(60201040)),
            "https://www.wienerlinien.at/ogd_realtime/monitor?diva=60201040\
             &activateTrafficInfo=stoerungkurz\
             &activateTrafficInfo=stoerunglang\
             &activateTrafficInfo=elevatorinfo"
        );
    }

    #[test]
    fn request_url_through_relay_is_encoded() {
        let client =
            MonitorClient::new(MonitorConfig::new().with_relay("https://relay.example/?")).unwrap();

        let url = client.request_url(Diva::new(42));

        assert!(url.starts_with("https://relay.example/?https%3A%2F%2Fwww.wienerlinien.at"));
        assert!(url.contains("diva%3D42"));
        assert!(!url["https://relay.example/?".len()..].contains('&'));
    }
}
