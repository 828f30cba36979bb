//! File-backed catalog loading and save slots.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use umatracker_core::{CatalogError, CatalogLoader, RaceCatalog, SavedSlot, SlotNumber, SnapshotStorage};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog {} is invalid: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Catalog from a JSON file, or the bundled one when no path is given.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    path: Option<PathBuf>,
}

impl CatalogSource {
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn label(&self) -> String {
        self.path
            .as_ref()
            .map_or_else(|| "bundled catalog".to_string(), |p| p.display().to_string())
    }
}

impl CatalogLoader for CatalogSource {
    type Error = StorageError;

    fn load_catalog(&self) -> Result<RaceCatalog, Self::Error> {
        let Some(path) = &self.path else {
            return Ok(RaceCatalog::builtin().clone());
        };
        let json = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        RaceCatalog::from_json(&json).map_err(|source| StorageError::Catalog {
            path: path.clone(),
            source,
        })
    }
}

/// On-disk slot document: the saved slot plus a write timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSlot {
    saved_at: String,
    #[serde(flatten)]
    slot: SavedSlot,
}

/// Save slots as `umatracker_slot_<n>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct FileSlotStorage {
    dir: PathBuf,
}

impl FileSlotStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, slot: SlotNumber) -> PathBuf {
        self.dir.join(format!("umatracker_slot_{slot}.json"))
    }

    fn read(&self, slot: SlotNumber) -> Result<Option<StoredSlot>, StorageError> {
        let path = self.slot_path(slot);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_error(&path, err)),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Json { path, source })
    }

    /// When the slot was last written, if it exists.
    pub fn saved_at(&self, slot: SlotNumber) -> Result<Option<String>, StorageError> {
        Ok(self.read(slot)?.map(|stored| stored.saved_at))
    }
}

impl SnapshotStorage for FileSlotStorage {
    type Error = StorageError;

    fn save_slot(&self, slot: SlotNumber, saved: &SavedSlot) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let path = self.slot_path(slot);
        let stored = StoredSlot {
            saved_at: Utc::now().to_rfc3339(),
            slot: saved.clone(),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn load_slot(&self, slot: SlotNumber) -> Result<Option<SavedSlot>, Self::Error> {
        Ok(self.read(slot)?.map(|stored| stored.slot))
    }

    fn delete_slot(&self, slot: SlotNumber) -> Result<(), Self::Error> {
        let path = self.slot_path(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&path, err)),
        }
    }
}
