//! Station polling state machine.
//!
//! The poller is either idle (no station) or active for exactly one
//! station. Activating spawns an immediate fetch and a ticker task that
//! fetches again every interval. Switching or clearing the station aborts the
//! ticker before anything else happens, so at most one ticker is ever live.
//!
//! Fetches run in their own tasks and may overlap (slow response, manual
//! refresh, station change). Every fetch is tagged with the selection epoch
//! and a sequence number; only the most recently issued fetch may publish its
//! result, anything older is dropped on arrival.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::{DepartureRecord, Diva, Station};
use crate::monitor::{DepartureSource, NetworkError};

use super::config::PollConfig;
use super::snapshot::BoardSnapshot;

/// What happened to a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// New departures were published.
    Applied,
    /// The fetch failed; the board was flagged as stale.
    Failed,
    /// A newer fetch was issued meanwhile; the result was dropped.
    Discarded,
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequestTag {
    epoch: u64,
    seq: u64,
}

enum Phase {
    Idle,
    Active {
        station: Station,
        ticker: JoinHandle<()>,
    },
}

/// Mutable control state. Guarded by a std mutex that is never held across
/// an `.await`.
struct Control {
    phase: Phase,
    /// Bumped on every selection change.
    epoch: u64,
    next_seq: u64,
    latest: Option<RequestTag>,
}

impl Control {
    fn stop_ticker(&mut self) {
        if let Phase::Active { ticker, station } = std::mem::replace(&mut self.phase, Phase::Idle) {
            ticker.abort();
            debug!(diva = %station.diva, "ticker stopped");
        }
    }

    fn active_diva(&self) -> Option<Diva> {
        match &self.phase {
            Phase::Active { station, .. } => Some(station.diva),
            Phase::Idle => None,
        }
    }
}

struct Shared<S> {
    source: S,
    interval: Duration,
    board: watch::Sender<BoardSnapshot>,
    control: Mutex<Control>,
}

impl<S> Shared<S> {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a new request tag for `epoch`, or `None` if that selection is
    /// no longer current.
    fn issue(&self, control: &mut Control, epoch: u64) -> Option<(Diva, RequestTag)> {
        if control.epoch != epoch {
            return None;
        }
        let diva = control.active_diva()?;

        control.next_seq += 1;
        let tag = RequestTag {
            epoch,
            seq: control.next_seq,
        };
        control.latest = Some(tag);
        self.board.send_modify(|board| board.loading = true);

        Some((diva, tag))
    }

    /// Publish a fetch result if it is still the latest request.
    fn complete(
        &self,
        tag: RequestTag,
        diva: Diva,
        result: Result<Vec<DepartureRecord>, NetworkError>,
    ) -> PollOutcome {
        // Held while publishing so a concurrent selection change cannot slip
        // between the check and the write.
        let control = self.lock_control();

        if control.latest != Some(tag) {
            debug!(%diva, epoch = tag.epoch, seq = tag.seq, "discarding superseded response");
            return PollOutcome::Discarded;
        }

        match result {
            Ok(departures) => {
                debug!(%diva, departures = departures.len(), "departures updated");
                self.board.send_modify(|board| {
                    board.departures = departures;
                    board.loading = false;
                    board.error = false;
                    board.last_updated = Some(Local::now());
                });
                PollOutcome::Applied
            }
            Err(e) => {
                warn!(%diva, error = %e, "failed to fetch departures, keeping previous board");
                self.board.send_modify(|board| {
                    board.loading = false;
                    board.error = true;
                });
                PollOutcome::Failed
            }
        }
    }
}

/// Drives periodic departure fetches for the selected station.
pub struct Poller<S> {
    shared: Arc<Shared<S>>,
}

impl<S: DepartureSource> Poller<S> {
    /// Create an idle poller.
    ///
    /// Must be used from within a tokio runtime: selecting a station spawns
    /// tasks.
    pub fn new(source: S, config: &PollConfig) -> Self {
        let (board, _) = watch::channel(BoardSnapshot::default());

        Self {
            shared: Arc::new(Shared {
                source,
                interval: config.interval(),
                board,
                control: Mutex::new(Control {
                    phase: Phase::Idle,
                    epoch: 0,
                    next_seq: 0,
                    latest: None,
                }),
            }),
        }
    }

    /// Receive every published board state.
    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.shared.board.subscribe()
    }

    /// The current board state.
    pub fn snapshot(&self) -> BoardSnapshot {
        self.shared.board.borrow().clone()
    }

    /// The selected station, if any.
    pub fn station(&self) -> Option<Station> {
        match &self.shared.lock_control().phase {
            Phase::Active { station, .. } => Some(station.clone()),
            Phase::Idle => None,
        }
    }

    /// Access the departure source.
    pub fn source(&self) -> &S {
        &self.shared.source
    }

    /// Change the selected station.
    ///
    /// `Some` (a different station) restarts polling: the old ticker is
    /// aborted, the board is reset, and an immediate fetch is spawned; its
    /// handle is returned. `None` stops polling and clears the board.
    /// Selecting the station that is already active does nothing.
    pub fn select(&self, station: Option<Station>) -> Option<JoinHandle<PollOutcome>> {
        match station {
            Some(station) => self.activate(station),
            None => {
                self.clear();
                None
            }
        }
    }

    /// Fetch now, outside the timer cadence.
    ///
    /// The ticker's schedule is left untouched. Returns `None` while idle.
    pub fn refresh(&self) -> Option<JoinHandle<PollOutcome>> {
        let mut control = self.shared.lock_control();
        let epoch = control.epoch;
        let (diva, tag) = self.shared.issue(&mut control, epoch)?;
        debug!(%diva, seq = tag.seq, "manual refresh");
        Some(tokio::spawn(poll_once(Arc::clone(&self.shared), diva, tag)))
    }

    fn activate(&self, station: Station) -> Option<JoinHandle<PollOutcome>> {
        let mut control = self.shared.lock_control();

        if control.active_diva() == Some(station.diva) {
            return None;
        }

        control.stop_ticker();
        control.epoch += 1;
        control.latest = None;
        let epoch = control.epoch;

        info!(diva = %station.diva, name = %station.name, "station selected");
        self.shared
            .board
            .send_replace(BoardSnapshot::for_station(station.clone()));

        let ticker = tokio::spawn(run_ticker(Arc::clone(&self.shared), epoch));
        control.phase = Phase::Active { station, ticker };

        let (diva, tag) = self.shared.issue(&mut control, epoch)?;
        Some(tokio::spawn(poll_once(Arc::clone(&self.shared), diva, tag)))
    }

    fn clear(&self) {
        let mut control = self.shared.lock_control();

        if control.active_diva().is_some() {
            info!("station cleared");
        }

        control.stop_ticker();
        control.epoch += 1;
        control.latest = None;
        self.shared.board.send_replace(BoardSnapshot::default());
    }
}

impl<S> Drop for Poller<S> {
    fn drop(&mut self) {
        // The ticker holds an `Arc` to the shared state; abort it so the
        // cycle does not keep polling after the owner is gone.
        self.shared.lock_control().stop_ticker();
    }
}

/// Fetch once and publish the result.
async fn poll_once<S: DepartureSource>(
    shared: Arc<Shared<S>>,
    diva: Diva,
    tag: RequestTag,
) -> PollOutcome {
    let result = shared.source.fetch_departures(diva).await;
    shared.complete(tag, diva, result)
}

/// Spawn a fetch every interval until aborted or the selection changes.
async fn run_ticker<S: DepartureSource>(shared: Arc<Shared<S>>, epoch: u64) {
    let period = shared.interval;
    // The immediate fetch is spawned by `activate`; the first tick is one
    // period later.
    let mut ticks = time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;

        let issued = {
            let mut control = shared.lock_control();
            shared.issue(&mut control, epoch)
        };
        let Some((diva, tag)) = issued else {
            break;
        };

        debug!(%diva, seq = tag.seq, "poll tick");
        tokio::spawn(poll_once(Arc::clone(&shared), diva, tag));
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
