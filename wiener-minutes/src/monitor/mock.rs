//! Mock monitor client for running without API access.
//!
//! Loads recorded monitor payloads from JSON files and serves them as if
//! they were live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use crate::domain::{DepartureRecord, Diva};

use super::DepartureSource;
use super::error::NetworkError;
use super::normalize::normalize;
use super::types::MonitorResponse;

/// Mock client that serves monitor payloads from JSON files.
#[derive(Clone)]
pub struct MockMonitorClient {
    /// Pre-loaded monitor payloads, keyed by DIVA.
    monitors: Arc<HashMap<Diva, MonitorResponse>>,
}

impl MockMonitorClient {
    /// Create a new mock client by loading JSON files from a directory.
    ///
    /// Expects files named `{DIVA}.json` (e.g. `60200657.json`).
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let monitors = load_dir(data_dir.as_ref())?;
        Ok(Self {
            monitors: Arc::new(monitors),
        })
    }

    /// Get departures for a station.
    ///
    /// Mimics [`MonitorClient::get_departures`](super::MonitorClient::get_departures).
    /// Countdowns are static, as recorded.
    pub async fn get_departures(&self, diva: Diva) -> Result<Vec<DepartureRecord>, NetworkError> {
        let monitors = &self.monitors;

        let raw = monitors.get(&diva).ok_or_else(|| NetworkError::Status {
            status: 404,
            message: format!(
                "No mock data for station {}. Available: {:?}",
                diva,
                monitors.keys().collect::<Vec<_>>()
            ),
        })?;

        Ok(normalize(raw, Utc::now()))
    }

    /// List available stations in the mock data.
    pub fn available_stations(&self) -> Vec<Diva> {
        let mut stations: Vec<Diva> = self.monitors.keys().copied().collect();
        stations.sort();
        stations
    }
}

impl DepartureSource for MockMonitorClient {
    async fn fetch_departures(&self, diva: Diva) -> Result<Vec<DepartureRecord>, NetworkError> {
        self.get_departures(diva).await
    }
}

/// Read every `{DIVA}.json` file in a directory.
fn load_dir(data_dir: &Path) -> Result<HashMap<Diva, MonitorResponse>, NetworkError> {
    let mut monitors = HashMap::new();

    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        NetworkError::NotConfigured(format!("failed to read mock data directory: {e}"))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            NetworkError::NotConfigured(format!("failed to read directory entry: {e}"))
        })?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        // "60200657.json" -> 60200657
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| NetworkError::NotConfigured(format!("invalid filename: {path:?}")))?;

        let diva = Diva::parse(stem).map_err(|_| {
            NetworkError::NotConfigured(format!("invalid DIVA in filename: {stem}"))
        })?;

        let json = std::fs::read_to_string(&path)
            .map_err(|e| NetworkError::NotConfigured(format!("failed to read {path:?}: {e}")))?;

        let raw: MonitorResponse = serde_json::from_str(&json)
            .map_err(|e| NetworkError::NotConfigured(format!("failed to parse {path:?}: {e}")))?;

        monitors.insert(diva, raw);
    }

    if monitors.is_empty() {
        return Err(NetworkError::NotConfigured(format!(
            "no mock monitor files found in {data_dir:?}"
        )));
    }

    Ok(monitors)
}
