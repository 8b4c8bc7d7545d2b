//! Local filesystem snapshot slot.
//!
//! Keeps the board collection in one JSON file with:
//! - Atomic writes (write to .tmp, fsync, rename)
//! - A version token: SHA-256 of the content last read or written. A write
//!   finding different content on disk is rejected as stale instead of
//!   overwriting another writer's changes.
//! - Mutex-guarded writes within the process
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use super::{SnapshotSlot, StorageError};

pub struct FileSlot {
    path: PathBuf,
    /// Hash of the content this slot last observed. `None` until the first
    /// read or write; an absent file hashes as empty content.
    observed_hash: Mutex<Option<String>>,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            observed_hash: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version token of the content last read or written.
    pub fn version_token(&self) -> Option<String> {
        self.observed_hash
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Compute SHA-256 hash of content (for change detection).
    fn content_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn read_disk(&self) -> Result<Option<String>, std::io::Error> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Atomic write with fsync: write to .tmp, fsync, rename, fsync directory.
    /// Refuses to write empty content over a non-empty file (data safety).
    fn atomic_write(path: &Path, content: &str) -> Result<(), std::io::Error> {
        if content.trim().is_empty() {
            if let Ok(existing) = fs::read_to_string(path) {
                if !existing.trim().is_empty() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "Refusing to overwrite non-empty file with empty content",
                    ));
                }
            }
        }

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let tmp_path = path.with_extension("brain.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;

        // fsync directory for rename durability
        if let Some(dir) = path.parent() {
            if let Ok(d) = fs::File::open(dir) {
                let _ = d.sync_all();
            }
        }
        Ok(())
    }
}

impl SnapshotSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let mut observed = self.observed_hash.lock().unwrap_or_else(|e| e.into_inner());
        let content = self.read_disk()?;
        *observed = Some(Self::content_hash(content.as_deref().unwrap_or("")));
        Ok(content)
    }

    fn write(&self, snapshot: &str) -> Result<(), StorageError> {
        let mut observed = self.observed_hash.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(expected) = observed.as_ref() {
            let on_disk = self.read_disk()?;
            let found = Self::content_hash(on_disk.as_deref().unwrap_or(""));
            if &found != expected {
                log::warn!(
                    "[brain.storage.local] {:?} changed by another writer, rejecting stale write",
                    self.path
                );
                return Err(StorageError::StaleSnapshot {
                    expected: expected.clone(),
                    found,
                });
            }
        }

        Self::atomic_write(&self.path, snapshot)?;
        *observed = Some(Self::content_hash(snapshot));
        Ok(())
    }
}
