//! Plain-text departure board.

use std::fmt::Write as _;

use crate::domain::DepartureRecord;
use crate::poller::BoardSnapshot;

const LINE_WIDTH: usize = 5;
const DESTINATION_WIDTH: usize = 26;

/// Keep departures whose line name contains `filter`, ignoring case.
///
/// An empty filter keeps everything.
pub fn filter_by_line<'a>(
    departures: &'a [DepartureRecord],
    filter: &str,
) -> Vec<&'a DepartureRecord> {
    let filter = filter.trim().to_lowercase();
    departures
        .iter()
        .filter(|d| filter.is_empty() || d.line_name.to_lowercase().contains(&filter))
        .collect()
}

/// Render the board for a terminal.
///
/// States are checked in order: standby (no station), connection error,
/// loading with nothing to show yet, no matching departures, and finally the
/// departure table.
pub fn render(snapshot: &BoardSnapshot, line_filter: &str) -> String {
    let mut out = String::new();

    let Some(station) = &snapshot.station else {
        out.push_str("[ SYSTEM STANDBY ]\n");
        out.push_str("SELECT STATION TO INITIALIZE\n");
        return out;
    };

    let _ = writeln!(out, "{} ({})", station.name.to_uppercase(), station.diva);
    if !line_filter.trim().is_empty() {
        let _ = writeln!(out, "FILTER: {}", line_filter.trim().to_uppercase());
    }
    out.push('\n');

    if snapshot.error {
        out.push_str("CONNECTION ERROR\n");
        out.push_str("DATA STREAM INTERRUPTED.\n");
        return out;
    }

    if snapshot.loading && snapshot.departures.is_empty() {
        out.push_str("LOADING...\n");
        return out;
    }

    let rows = filter_by_line(&snapshot.departures, line_filter);
    if rows.is_empty() {
        out.push_str("NO DEPARTURES FOUND.\n");
    } else {
        let _ = writeln!(
            out,
            "{:<lw$} {:<dw$} TIME",
            "LINE",
            "DESTINATION",
            lw = LINE_WIDTH,
            dw = DESTINATION_WIDTH
        );
        for departure in rows {
            render_row(&mut out, departure);
        }
    }

    if let Some(updated) = snapshot.last_updated {
        let _ = writeln!(out, "\nLAST UPDATED {}", updated.format("%H:%M:%S"));
    }
    out
}

fn render_row(out: &mut String, departure: &DepartureRecord) {
    let destination: String = departure
        .destination
        .to_uppercase()
        .chars()
        .take(DESTINATION_WIDTH)
        .collect();

    let time = if departure.is_now() {
        "NOW".to_string()
    } else {
        format!("{} MIN", departure.countdown)
    };

    let _ = write!(
        out,
        "{:<lw$} {:<dw$} {time}",
        departure.line_name,
        destination,
        lw = LINE_WIDTH,
        dw = DESTINATION_WIDTH
    );
    if let Some(next) = departure.next_countdown {
        let _ = write!(out, "  NEXT IN {next} MIN");
    }
    out.push('\n');
}
