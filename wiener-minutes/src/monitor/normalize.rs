//! Flattening of monitor responses into departure records.
//!
//! The upstream payload is nested monitor → lines → departures. The board
//! shows one row per monitor: the first line's soonest departure, with the
//! second departure (if any) as the "next" countdown. Missing data at any
//! level is normal (end of service, closed platform) and yields no row.

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::domain::DepartureRecord;

use super::types::{Monitor, MonitorResponse};

/// Convert a monitor response into board rows, sorted by countdown.
///
/// `fetched_at` seeds the record ids, so two results fetched at different
/// instants do not share keys.
pub fn normalize(response: &MonitorResponse, fetched_at: DateTime<Utc>) -> Vec<DepartureRecord> {
    let Some(monitors) = response
        .data
        .as_ref()
        .and_then(|data| data.monitors.as_deref())
    else {
        return Vec::new();
    };

    let stamp = fetched_at.timestamp_millis();

    let mut records: Vec<DepartureRecord> = monitors
        .iter()
        .enumerate()
        .filter_map(|(index, monitor)| convert_monitor(index, monitor, stamp))
        .collect();

    // `sort_by_key` is stable: equal countdowns keep monitor order.
    records.sort_by_key(|record| record.countdown);

    records
}

/// Build the row for a single monitor, if it has anything to show.
fn convert_monitor(index: usize, monitor: &Monitor, stamp: i64) -> Option<DepartureRecord> {
    // Only the first line of a monitor is shown.
    let Some(line) = monitor.lines.as_deref().and_then(<[_]>::first) else {
        trace!(monitor = index, "skipping monitor without lines");
        return None;
    };

    let departures = line
        .departures
        .as_ref()
        .map(|d| d.departure.as_slice())
        .unwrap_or_default();

    let Some(countdown) = departures
        .first()
        .and_then(|d| d.departure_time.as_ref())
        .and_then(|t| t.countdown)
    else {
        trace!(monitor = index, line = %line.name, "skipping line without countdown");
        return None;
    };

    let next_countdown = departures
        .get(1)
        .and_then(|d| d.departure_time.as_ref())
        .and_then(|t| t.countdown);

    Some(DepartureRecord {
        id: format!("{}-{}-{}", index, line.name, stamp),
        line_name: line.name.clone(),
        line_type: line.kind.clone(),
        destination: line.towards.clone(),
        countdown,
        next_countdown,
    })
}
