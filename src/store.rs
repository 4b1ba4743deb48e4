use crate::error::{Error, Result};
use crate::graph::{Point, PositionMap};
use tracing::warn;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const NODE_POSITIONS_KEY: &str = "node-positions";
pub const PREVIOUS_POSITIONS_KEY: &str = "previous-positions";
pub const FLAT_LAYOUT_KEY: &str = "flat-layout-enabled";

/// Opaque string key-value backend the position store persists through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// In-memory backend for tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Backend persisting entries as a single JSON object on disk. Every write
/// rewrites the file, which is fine at the handful-of-keys scale the store
/// uses.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|err| Error::store(format!("{}: {err}", path.display())))?;
            serde_json::from_str(&contents)
                .map_err(|err| Error::store(format!("{}: {err}", path.display())))?
        } else {
            BTreeMap::new()
        };
        Ok(FileStore {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn flush(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, contents)
            .map_err(|err| Error::store(format!("{}: {err}", self.path.display())))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Saved-layout persistence: current positions, a one-level undo snapshot,
/// and the flat-layout toggle. Backend failures degrade to defaults with a
/// warning instead of failing the caller.
#[derive(Debug)]
pub struct PositionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PositionStore<S> {
    pub fn new(backend: S) -> Self {
        PositionStore { backend }
    }

    /// Current saved positions. Empty when nothing was saved or the stored
    /// payload is unreadable.
    pub fn load(&self) -> PositionMap {
        self.read_map(NODE_POSITIONS_KEY).unwrap_or_default()
    }

    /// Replaces the saved positions wholesale.
    pub fn save(&mut self, positions: &PositionMap) {
        self.write_map(NODE_POSITIONS_KEY, positions);
    }

    /// Merges a single node's position into the saved map, as after a drag.
    pub fn save_node(&mut self, node_id: &str, position: Point) {
        let mut positions = self.load();
        positions.insert(node_id.to_string(), position);
        self.save(&positions);
    }

    /// Snapshots the given positions into the undo slot.
    pub fn save_previous(&mut self, positions: &PositionMap) {
        self.write_map(PREVIOUS_POSITIONS_KEY, positions);
    }

    pub fn load_previous(&self) -> Option<PositionMap> {
        self.read_map(PREVIOUS_POSITIONS_KEY)
    }

    /// Promotes the undo snapshot back to the current positions and consumes
    /// it. Returns the restored map, or `None` when no snapshot exists.
    pub fn undo(&mut self) -> Option<PositionMap> {
        let previous = self.load_previous()?;
        self.save(&previous);
        if let Err(err) = self.backend.delete(PREVIOUS_POSITIONS_KEY) {
            warn!("failed to drop undo snapshot: {err}");
        }
        Some(previous)
    }

    /// Removes the current positions. The undo snapshot stays.
    pub fn clear(&mut self) {
        if let Err(err) = self.backend.delete(NODE_POSITIONS_KEY) {
            warn!("failed to clear saved positions: {err}");
        }
    }

    pub fn set_flat_layout(&mut self, enabled: bool) {
        let value = if enabled { "true" } else { "false" };
        if let Err(err) = self.backend.set(FLAT_LAYOUT_KEY, value) {
            warn!("failed to persist flat layout flag: {err}");
        }
    }

    pub fn flat_layout_enabled(&self) -> bool {
        match self.backend.get(FLAT_LAYOUT_KEY) {
            Ok(Some(value)) => value == "true",
            Ok(None) => false,
            Err(err) => {
                warn!("failed to read flat layout flag: {err}");
                false
            }
        }
    }

    fn read_map(&self, key: &str) -> Option<PositionMap> {
        let raw = match self.backend.get(key) {
            Ok(value) => value?,
            Err(err) => {
                warn!("position store read failed for {key}: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => Some(map),
            Err(err) => {
                warn!("discarding unreadable position data under {key}: {err}");
                None
            }
        }
    }

    fn write_map(&mut self, key: &str, positions: &PositionMap) {
        let payload = match serde_json::to_string(positions) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("failed to encode positions for {key}: {err}");
                return;
            }
        };
        if let Err(err) = self.backend.set(key, &payload) {
            warn!("position store write failed for {key}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(entries: &[(&str, f32, f32)]) -> PositionMap {
        entries
            .iter()
            .map(|(id, x, y)| (id.to_string(), Point::new(*x, *y)))
            .collect()
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut store = PositionStore::new(MemoryStore::new());
        assert!(store.load().is_empty());
        let saved = positions(&[("a", 10.0, 20.0), ("b", 30.0, 40.0)]);
        store.save(&saved);
        assert_eq!(store.load(), saved);
    }

    #[test]
    fn save_node_merges_instead_of_replacing() {
        let mut store = PositionStore::new(MemoryStore::new());
        store.save(&positions(&[("a", 1.0, 1.0), ("b", 2.0, 2.0)]));
        store.save_node("b", Point::new(99.0, 98.0));
        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["a"], Point::new(1.0, 1.0));
        assert_eq!(loaded["b"], Point::new(99.0, 98.0));
    }

    #[test]
    fn undo_restores_and_consumes_the_snapshot() {
        let mut store = PositionStore::new(MemoryStore::new());
        let before = positions(&[("a", 1.0, 1.0)]);
        let after = positions(&[("a", 50.0, 60.0)]);
        store.save(&before);
        store.save_previous(&before);
        store.save(&after);

        let restored = store.undo().unwrap();
        assert_eq!(restored, before);
        assert_eq!(store.load(), before);
        assert!(store.load_previous().is_none());
        assert!(store.undo().is_none());
    }

    #[test]
    fn clear_leaves_the_undo_snapshot_alone() {
        let mut store = PositionStore::new(MemoryStore::new());
        store.save(&positions(&[("a", 1.0, 1.0)]));
        store.save_previous(&positions(&[("a", 0.0, 0.0)]));
        store.clear();
        assert!(store.load().is_empty());
        assert!(store.load_previous().is_some());
    }

    #[test]
    fn flat_layout_flag_defaults_to_off() {
        let mut store = PositionStore::new(MemoryStore::new());
        assert!(!store.flat_layout_enabled());
        store.set_flat_layout(true);
        assert!(store.flat_layout_enabled());
        store.set_flat_layout(false);
        assert!(!store.flat_layout_enabled());
    }

    #[test]
    fn unreadable_payloads_degrade_to_empty() {
        let mut backend = MemoryStore::new();
        backend.set(NODE_POSITIONS_KEY, "not json").unwrap();
        let store = PositionStore::new(backend);
        assert!(store.load().is_empty());
    }

    #[test]
    fn failing_backend_degrades_to_defaults() {
        struct FailingStore;

        impl KeyValueStore for FailingStore {
            fn get(&self, _key: &str) -> crate::error::Result<Option<String>> {
                Err(crate::error::Error::store("backend offline"))
            }
            fn set(&mut self, _key: &str, _value: &str) -> crate::error::Result<()> {
                Err(crate::error::Error::store("backend offline"))
            }
            fn delete(&mut self, _key: &str) -> crate::error::Result<()> {
                Err(crate::error::Error::store("backend offline"))
            }
        }

        let mut store = PositionStore::new(FailingStore);
        assert!(store.load().is_empty());
        assert!(!store.flat_layout_enabled());
        store.save(&positions(&[("a", 1.0, 1.0)]));
        store.clear();
        assert!(store.undo().is_none());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let path = std::env::temp_dir().join(format!(
            "archflow-store-test-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let backend = FileStore::open(&path).unwrap();
            let mut store = PositionStore::new(backend);
            store.save(&positions(&[("a", 5.0, 6.0)]));
            store.set_flat_layout(true);
        }
        {
            let backend = FileStore::open(&path).unwrap();
            let store = PositionStore::new(backend);
            assert_eq!(store.load(), positions(&[("a", 5.0, 6.0)]));
            assert!(store.flat_layout_enabled());
        }

        let _ = std::fs::remove_file(&path);
    }
}
