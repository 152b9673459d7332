//! Static station directory.
//!
//! The directory is a JSON array of `{"name": ..., "diva": ...}` entries,
//! loaded once at startup. It maps names to DIVA numbers for selection and
//! search; it is never refreshed while running.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::domain::{Diva, Station};

use super::error::StationError;

/// In-memory station directory.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: Vec<Station>,
}

impl StationDirectory {
    /// Load the directory from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| StationError::io(path, e))?;

        let stations: Vec<Station> =
            serde_json::from_str(&json).map_err(|e| StationError::Json {
                message: format!("{}: {e}", path.display()),
            })?;

        let directory = Self::from_stations(stations);
        info!(path = %path.display(), stations = directory.len(), "loaded station directory");
        Ok(directory)
    }

    /// Build a directory from stations, dropping exact duplicates.
    pub fn from_stations(stations: impl IntoIterator<Item = Station>) -> Self {
        let mut seen = HashSet::new();
        let stations = stations
            .into_iter()
            .filter(|s| seen.insert((s.name.clone(), s.diva)))
            .collect();

        Self { stations }
    }

    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Look up a station by DIVA number.
    pub fn get(&self, diva: Diva) -> Option<&Station> {
        self.stations.iter().find(|s| s.diva == diva)
    }

    /// Search stations by name.
    ///
    /// Matching is a case-insensitive substring test on the trimmed term.
    /// An empty term lists the favorites only. Favorites sort first;
    /// otherwise directory order is kept.
    pub fn search(&self, term: &str, favorites: &[Diva], limit: usize) -> Vec<&Station> {
        let term = term.trim().to_lowercase();

        let mut matches: Vec<&Station> = if term.is_empty() {
            self.stations
                .iter()
                .filter(|s| favorites.contains(&s.diva))
                .collect()
        } else {
            self.stations
                .iter()
                .filter(|s| s.name.to_lowercase().contains(&term))
                .collect()
        };

        // Stable: non-favorites keep directory order.
        matches.sort_by_key(|s| !favorites.contains(&s.diva));
        matches.truncate(limit);
        matches
    }

    /// Resolve user input to a station: a DIVA number, an exact name, or a
    /// name fragment matching exactly one station.
    pub fn resolve(&self, query: &str) -> Result<Station, StationError> {
        let query = query.trim();

        if let Ok(diva) = Diva::parse(query) {
            return Ok(self
                .get(diva)
                .cloned()
                .unwrap_or_else(|| Station::new(diva, diva.to_string())));
        }

        let lowered = query.to_lowercase();
        if let Some(exact) = self
            .stations
            .iter()
            .find(|s| s.name.to_lowercase() == lowered)
        {
            return Ok(exact.clone());
        }

        match self.search(query, &[], 2).as_slice() {
            [only] => Ok((*only).clone()),
            _ => Err(StationError::UnknownStation(query.to_string())),
        }
    }
}
