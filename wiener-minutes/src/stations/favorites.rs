//! Persisted favorite stations.
//!
//! Favorites live in a [`KeyValueStore`] under a single fixed key, as a JSON
//! array of DIVA numbers. Every toggle is written through immediately.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::Diva;

use super::error::StationError;

/// Key under which favorites are stored.
pub const FAVORITES_KEY: &str = "wienCountdownFavorites";

/// String key-value persistence.
pub trait KeyValueStore {
    /// Read a value, `None` if the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>, StationError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: String) -> Result<(), StationError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StationError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StationError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// The file is read on every access, so edits made by another process are
/// picked up. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store at `path`. Nothing is touched until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StationError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StationError::io(&self.path, e)),
        };

        serde_json::from_str(&contents).map_err(|e| StationError::Json {
            message: format!("{}: {e}", self.path.display()),
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StationError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StationError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StationError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&values).map_err(|e| StationError::Json {
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| StationError::io(&self.path, e))
    }
}

/// The user's favorite stations, in the order they were added.
#[derive(Debug)]
pub struct Favorites<S> {
    store: S,
    divas: Vec<Diva>,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Load favorites from `store`.
    ///
    /// A stored value that is not a JSON array of DIVA numbers is ignored
    /// and the list starts empty. Store access errors are returned.
    pub fn load(store: S) -> Result<Self, StationError> {
        let divas = match store.get(FAVORITES_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Diva>>(&raw) {
                Ok(divas) => divas,
                Err(e) => {
                    warn!(error = %e, "ignoring corrupt favorites");
                    Vec::new()
                }
            },
        };

        debug!(count = divas.len(), "favorites loaded");
        Ok(Self { store, divas })
    }

    /// Favorite DIVA numbers.
    pub fn list(&self) -> &[Diva] {
        &self.divas
    }

    /// Whether `diva` is a favorite.
    pub fn contains(&self, diva: Diva) -> bool {
        self.divas.contains(&diva)
    }

    /// Add or remove `diva` and persist the result.
    ///
    /// Returns whether `diva` is a favorite afterwards. On a write error the
    /// in-memory list is left unchanged.
    pub fn toggle(&mut self, diva: Diva) -> Result<bool, StationError> {
        let mut next = self.divas.clone();
        let added = match next.iter().position(|d| *d == diva) {
            Some(i) => {
                next.remove(i);
                false
            }
            None => {
                next.push(diva);
                true
            }
        };

        let json = serde_json::to_string(&next).map_err(|e| StationError::Json {
            message: e.to_string(),
        })?;
        self.store.set(FAVORITES_KEY, json)?;
        self.divas = next;

        debug!(%diva, added, "favorite toggled");
        Ok(added)
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_store_has_no_favorites() {
        let favorites = Favorites::load(MemoryStore::new()).unwrap();
        assert!(favorites.list().is_empty());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut favorites = Favorites::load(MemoryStore::new()).unwrap();
        let diva = Diva::new(60200657);

        assert!(favorites.toggle(diva).unwrap());
        assert!(favorites.contains(diva));
        assert_eq!(
            favorites.store().get(FAVORITES_KEY).unwrap().as_deref(),
            Some("[60200657]")
        );

        assert!(!favorites.toggle(diva).unwrap());
        assert!(!favorites.contains(diva));
        assert_eq!(
            favorites.store().get(FAVORITES_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn keeps_insertion_order() {
        let mut favorites = Favorites::load(MemoryStore::new()).unwrap();
        favorites.toggle(Diva::new(3)).unwrap();
        favorites.toggle(Diva::new(1)).unwrap();
        favorites.toggle(Diva::new(2)).unwrap();
        favorites.toggle(Diva::new(1)).unwrap();

        assert_eq!(favorites.list(), &[Diva::new(3), Diva::new(2)]);
    }

    #[test]
    fn corrupt_value_loads_empty() {
        let mut store = MemoryStore::new();
        store
            .set(FAVORITES_KEY, "{\"oops\": true}".to_string())
            .unwrap();

        let favorites = Favorites::load(store).unwrap();
        assert!(favorites.list().is_empty());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("favorites.json");

        let mut favorites = Favorites::load(FileStore::new(&path)).unwrap();
        favorites.toggle(Diva::new(60201198)).unwrap();
        favorites.toggle(Diva::new(60200627)).unwrap();

        let reloaded = Favorites::load(FileStore::new(&path)).unwrap();
        assert_eq!(
            reloaded.list(),
            &[Diva::new(60201198), Diva::new(60200627)]
        );
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("state.json"));

        store.set("theme", "dark".to_string()).unwrap();
        store.set(FAVORITES_KEY, "[1]".to_string()).unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get(FAVORITES_KEY).unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn file_store_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("favorites.json");

        let mut store = FileStore::new(&path);
        store.set(FAVORITES_KEY, "[]".to_string()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_file_reads_empty() {
        let store = FileStore::new("/nonexistent/path/favorites.json");
        assert_eq!(store.get(FAVORITES_KEY).unwrap(), None);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "not json").unwrap();

        let result = Favorites::load(FileStore::new(&path));
        assert!(matches!(result, Err(StationError::Json { .. })));
    }
}
