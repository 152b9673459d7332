//! Station directory, name search, and favorites.
//!
//! The directory is static reference data loaded from disk at startup.
//! Favorites are persisted through an injected [`KeyValueStore`].

mod directory;
mod error;
mod favorites;

pub use directory::StationDirectory;
pub use error::StationError;
pub use favorites::{FAVORITES_KEY, Favorites, FileStore, KeyValueStore, MemoryStore};
