//! Station reference data.

use serde::{Deserialize, Serialize};

use super::Diva;

/// A stop from the static station directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Station {
    /// DIVA number used to query the realtime monitor.
    pub diva: Diva,
    /// Display name, e.g. "Stephansplatz".
    pub name: String,
}

impl Station {
    /// Create a station from its id and name.
    pub fn new(diva: Diva, name: impl Into<String>) -> Self {
        Self {
            diva,
            name: name.into(),
        }
    }
}
