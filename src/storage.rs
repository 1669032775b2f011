//! Persistence contract for the task collection.
//!
//! The `Storage` trait is the only way the repository reaches disk. The JSON
//! implementation rewrites the whole file on every save via a temp file and a
//! rename, so a crash mid-write leaves the previous contents in place.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::task::Task;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read tasks from '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse tasks in '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save tasks to '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize tasks to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to copy unreadable store to '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub trait Storage {
    /// Load every stored task. A store that does not exist yet is empty.
    fn load(&self) -> Result<Vec<Task>, StorageError>;

    /// Replace the stored collection with `tasks`.
    fn save_all(&self, tasks: &[Task]) -> Result<(), StorageError>;

    /// Keep a copy of a store that failed to load so the next save cannot
    /// destroy it. Returns where the copy went, if anywhere.
    fn preserve_unreadable(&self) -> Result<Option<PathBuf>, StorageError> {
        Ok(None)
    }
}

/// A single JSON array on disk.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Task>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no task store yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save_all(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(tasks)
            .map_err(|e| StorageError::SerializeFailed { source: e })?;

        // Atomic-ish write via temp + rename.
        let tmp = self.temp_path();
        let write = |path: &Path| -> io::Result<()> {
            let mut f = File::create(path)?;
            f.write_all(data.as_bytes())?;
            f.flush()?;
            f.sync_all()
        };
        write(&tmp)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&tmp);
                StorageError::WriteFailed {
                    path: self.path.clone(),
                    source: e,
                }
            })?;
        debug!(path = %self.path.display(), count = tasks.len(), "tasks saved");
        Ok(())
    }

    fn preserve_unreadable(&self) -> Result<Option<PathBuf>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.corrupt_path();
        fs::copy(&self.path, &target).map_err(|e| StorageError::BackupFailed {
            path: target.clone(),
            source: e,
        })?;
        warn!(from = %self.path.display(), to = %target.display(), "kept a copy of the unreadable task store");
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};
    use tempfile::TempDir;

    use crate::fields::Status;

    fn storage_in(dir: &TempDir) -> JsonFileStorage {
        JsonFileStorage::new(dir.path().join("tasks.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_content() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        let now = Local::now();

        let mut first = Task::new("Buy milk", now + Duration::days(1), now);
        first.notes = vec!["semi-skimmed".into(), "two litres".into()];
        first.set_status(Status::Done, now);
        let second = Task::new("Call plumber", now + Duration::days(2), now);
        let tasks = vec![first, second];

        storage.save_all(&tasks).unwrap();
        assert_eq!(storage.load().unwrap(), tasks);
        assert!(!storage.temp_path().exists());

        storage.save_all(&[]).unwrap();
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_status_is_written_as_string() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        let now = Local::now();
        let mut task = Task::new("Stretch", now, now);
        task.set_status(Status::InProgress, now);
        storage.save_all(&[task]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["status"], "in-progress");
        assert!(raw[0]["id"].is_string());
        assert!(raw[0].get("completed_at").is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error_and_can_be_preserved() {
        let dir = TempDir::new().unwrap();
        let storage = storage_in(&dir);
        fs::write(storage.path(), "{ not json").unwrap();

        let err = storage.load().unwrap_err();
        assert!(matches!(err, StorageError::ParseFailed { .. }));

        let copy = storage.preserve_unreadable().unwrap().unwrap();
        assert_eq!(fs::read_to_string(copy).unwrap(), "{ not json");
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nope").join("tasks.json"));
        let err = storage.save_all(&[]).unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));
    }
}
