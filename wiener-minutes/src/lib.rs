//! Realtime departure monitor for Vienna public transport.
//!
//! Polls the Wiener Linien realtime monitor for one selected station and
//! keeps a departure board current: what leaves next, on which line, in how
//! many minutes.
//!
//! - [`monitor`] fetches and normalizes upstream monitor payloads.
//! - [`cache`] enforces the provider's minimum request interval.
//! - [`poller`] runs the per-station polling state machine.
//! - [`stations`] holds the station directory and favorites.
//! - [`board`] renders a snapshot as text.

pub mod board;
pub mod cache;
pub mod domain;
pub mod monitor;
pub mod poller;
pub mod stations;
