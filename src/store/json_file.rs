//! JSON file backend.
//!
//! The collection lives in a single pretty-printed JSON array. Saves go through
//! `<file>.tmp` and a rename so a crash mid-write never leaves a truncated
//! document behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::GreetingStore;
use crate::errors::AppError;
use crate::models::{check_collection, Greeting};

/// File-backed greeting store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories and an empty
    /// collection if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let store = Self { path: path.into() };

        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::StorageWrite(format!(
                    "Failed to create data directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        if !store.path.exists() {
            tracing::info!("Initializing empty greeting store at {:?}", store.path);
            store.save(&[])?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush the directory entry written by the rename. Best effort: not every
    /// platform lets a directory be opened for syncing.
    fn sync_parent_dir(&self) {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            tracing::debug!("Could not sync directory {:?}: {}", parent, e);
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json");
        self.path.with_extension(format!("{ext}.tmp"))
    }
}

impl GreetingStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Greeting>, AppError> {
        let bytes = fs::read(&self.path).map_err(|e| {
            AppError::StorageRead(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let invalid = |reason: String| {
            AppError::StorageRead(format!(
                "{} is not a valid greeting collection: {}",
                self.path.display(),
                reason
            ))
        };

        let greetings: Vec<Greeting> =
            serde_json::from_slice(&bytes).map_err(|e| invalid(e.to_string()))?;
        check_collection(&greetings).map_err(invalid)?;

        Ok(greetings)
    }

    fn save(&self, greetings: &[Greeting]) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(greetings)
            .map_err(|e| AppError::StorageWrite(format!("Failed to serialize greetings: {}", e)))?;

        let tmp = self.tmp_path();
        let write_err = |e: std::io::Error| {
            AppError::StorageWrite(format!("Failed to write {}: {}", self.path.display(), e))
        };

        let result = File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(e) = result {
            // Best effort: a stale temp file is harmless but untidy.
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }

        self.sync_parent_dir();

        tracing::debug!("Persisted {} greetings to {:?}", greetings.len(), self.path);
        Ok(())
    }
}
