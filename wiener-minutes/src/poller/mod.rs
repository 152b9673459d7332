//! Station polling.
//!
//! Owns the selected station and keeps its departure board fresh: one fetch
//! immediately on selection, then one per interval, plus manual refreshes.
//! Results are published as [`BoardSnapshot`]s on a watch channel.

mod config;
mod controller;
mod snapshot;

pub use config::{ConfigError, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL, PollConfig};
pub use controller::{PollOutcome, Poller};
pub use snapshot::BoardSnapshot;
