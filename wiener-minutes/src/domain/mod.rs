//! Domain types for the departure monitor.
//!
//! These are the validated values the rest of the crate passes around.
//! Upstream DTOs live in [`crate::monitor`] and are converted into these
//! types by the normalizer.

mod departure;
mod diva;
mod station;

pub use departure::DepartureRecord;
pub use diva::{Diva, InvalidDiva};
pub use station::Station;
