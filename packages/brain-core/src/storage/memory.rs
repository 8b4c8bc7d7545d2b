//! In-process snapshot slot.
//!
//! Behaves like a browser storage entry: one string value, optionally capped
//! by a byte quota. Writes over the quota fail and leave the old value.
use std::sync::RwLock;

use super::{SnapshotSlot, StorageError};

pub struct MemorySlot {
    value: RwLock<Option<String>>,
    quota: Option<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
            quota: None,
        }
    }

    pub fn with_contents(contents: &str) -> Self {
        Self {
            value: RwLock::new(Some(contents.to_string())),
            quota: None,
        }
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            value: RwLock::new(None),
            quota: Some(quota),
        }
    }
}

impl Default for MemorySlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .value
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn write(&self, snapshot: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if snapshot.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    needed: snapshot.len(),
                    quota,
                });
            }
        }
        *self.value.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_then_write() {
        let slot = MemorySlot::new();
        assert_eq!(slot.read().unwrap(), None);
        slot.write("[]").unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_quota_keeps_previous_value() {
        let slot = MemorySlot::with_quota(4);
        slot.write("[]").unwrap();
        let err = slot.write("[1,2,3]").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 7, quota: 4 }));
        assert_eq!(slot.read().unwrap().as_deref(), Some("[]"));
    }
}
