//! Normalized departure records.

use serde::Serialize;

/// One row of the departure board: the next vehicle of a line at a stop.
///
/// Produced fresh on every poll. Within one result set, records are ordered
/// by ascending `countdown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureRecord {
    /// Display key, unique within one result set.
    pub id: String,
    /// Line name, e.g. "U3" or "13A".
    pub line_name: String,
    /// Transport mode tag as reported upstream, e.g. "ptMetro".
    pub line_type: String,
    /// Destination text ("towards").
    pub destination: String,
    /// Minutes until departure. Zero or negative means the vehicle is
    /// leaving now.
    pub countdown: i32,
    /// Minutes until the following departure of the same line, if reported.
    pub next_countdown: Option<i32>,
}

impl DepartureRecord {
    /// Whether this vehicle is departing now.
    pub fn is_now(&self) -> bool {
        self.countdown <= 0
    }
}
