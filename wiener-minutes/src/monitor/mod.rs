//! Wiener Linien realtime monitor client.
//!
//! This module provides an HTTP client for the `ogd_realtime/monitor`
//! endpoint and the normalizer that flattens its payload into board rows.
//!
//! Key characteristics of the monitor API:
//! - Stations are addressed by DIVA number; one DIVA returns several
//!   monitors (one per platform/line grouping)
//! - Countdowns are whole minutes and may be zero or negative
//! - Arrays are omitted rather than sent empty when there is no service
//! - The data provider's terms forbid polling more often than every 15 s

use std::future::Future;

use crate::domain::{DepartureRecord, Diva};

mod client;
mod error;
mod mock;
mod normalize;
mod types;

pub use client::{DEFAULT_BASE_URL, MonitorClient, MonitorConfig};
pub use error::NetworkError;
pub use mock::MockMonitorClient;
pub use normalize::normalize;
pub use types::{
    Departure, DepartureTime, Departures, Line, LocationStop, Monitor, MonitorData,
    MonitorResponse, ServerMessage, TrafficInfo, Vehicle,
};

#[cfg(test)]
pub(crate) use normalize::test_support;

/// Something that can produce a station's current departures.
///
/// This abstraction lets the poller run against the live client, the
/// mock client, the rate-floor cache, or a test fake.
pub trait DepartureSource: Send + Sync + 'static {
    /// Fetch the departure list for a station.
    fn fetch_departures(
        &self,
        diva: Diva,
    ) -> impl Future<Output = Result<Vec<DepartureRecord>, NetworkError>> + Send;
}
