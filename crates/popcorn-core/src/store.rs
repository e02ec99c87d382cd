use popcorn_config::{PathManager, StorageConfig};
use popcorn_models::WatchedEntry;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize watched list: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store rejected write: {0}")]
    Rejected(String),
}

/// Durable slot holding the watched collection
///
/// `load` never fails: an absent or unreadable slot is an empty collection.
/// `save` reports failures so the caller can warn that changes will not
/// survive a restart.
pub trait WatchedStore: Send {
    fn load(&self) -> Vec<WatchedEntry>;
    fn save(&self, entries: &[WatchedEntry]) -> Result<(), StoreError>;
}

/// Result of a mutation that is applied in memory whether or not the write
/// to the store succeeded
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub warning: Option<StoreError>,
}

impl<T> Persisted<T> {
    pub fn durable(value: T) -> Self {
        Self { value, warning: None }
    }

    pub fn is_durable(&self) -> bool {
        self.warning.is_none()
    }
}

/// Slot stored as a JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(path_manager: &PathManager, storage: &StorageConfig) -> Self {
        let path = match &storage.data_dir {
            Some(dir) => dir.join(format!("{}.json", storage.slot)),
            None => path_manager.slot_file(&storage.slot),
        };
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io { path: path.to_path_buf(), source }
    }

    fn backup_corrupt_slot(&self) {
        let backup_path = self.path.with_extension("json.bak");
        match std::fs::copy(&self.path, &backup_path) {
            Ok(_) => info!("Backed up unreadable watched list to {}", backup_path.display()),
            Err(e) => warn!("Failed to back up unreadable watched list: {}", e),
        }
    }
}

impl WatchedStore for JsonFileStore {
    fn load(&self) -> Vec<WatchedEntry> {
        if !self.path.exists() {
            debug!("Watched list slot {} does not exist yet", self.path.display());
            return Vec::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read watched list {}: {}. Starting empty.", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<WatchedEntry>>(&content) {
            Ok(entries) => {
                info!("Loaded {} watched entries from {}", entries.len(), self.path.display());
                entries
            }
            Err(e) => {
                warn!("Watched list {} is corrupt ({}). Starting empty.", self.path.display(), e);
                self.backup_corrupt_slot();
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[WatchedEntry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let content = serde_json::to_string_pretty(entries)?;

        // Write to a temp file, then rename over the slot
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).map_err(|e| self.io_error(&temp_path, e))?;
        if let Err(e) = std::fs::rename(&temp_path, &self.path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(self.io_error(&self.path, e));
        }

        debug!("Saved {} watched entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemorySlot {
    entries: Vec<WatchedEntry>,
    fail_saves: bool,
    saves: usize,
}

/// In-process slot; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<MemorySlot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<WatchedEntry>) -> Self {
        let store = Self::default();
        store.lock().entries = entries;
        store
    }

    /// Make every following save fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    pub fn saved_entries(&self) -> Vec<WatchedEntry> {
        self.lock().entries.clone()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WatchedStore for MemoryStore {
    fn load(&self) -> Vec<WatchedEntry> {
        self.lock().entries.clone()
    }

    fn save(&self, entries: &[WatchedEntry]) -> Result<(), StoreError> {
        let mut slot = self.lock();
        if slot.fail_saves {
            return Err(StoreError::Rejected("memory store is read-only".to_string()));
        }
        slot.entries = entries.to_vec();
        slot.saves += 1;
        Ok(())
    }
}
