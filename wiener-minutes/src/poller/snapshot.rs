//! The board state handed to presentation.

use chrono::{DateTime, Local};

use crate::domain::{DepartureRecord, Station};

/// Everything presentation needs to draw the board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    /// Selected station, `None` while idle.
    pub station: Option<Station>,

    /// Departures from the last successful fetch, sorted by countdown.
    pub departures: Vec<DepartureRecord>,

    /// A fetch for the current station is in flight.
    pub loading: bool,

    /// The last fetch failed; `departures` is stale.
    pub error: bool,

    /// When `departures` was last replaced.
    pub last_updated: Option<DateTime<Local>>,
}

impl BoardSnapshot {
    /// Fresh board for a newly selected station.
    pub(crate) fn for_station(station: Station) -> Self {
        Self {
            station: Some(station),
            ..Self::default()
        }
    }

    /// Whether a station is selected.
    pub fn is_idle(&self) -> bool {
        self.station.is_none()
    }
}
