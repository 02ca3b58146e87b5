//! JSON file backend
//!
//! Stores the collection as one pretty-printed JSON array. Writes go
//! through `atomic_write`, so a failed write leaves the previous file
//! intact. A missing file reads as an empty collection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{atomic_write, RecordStorage};
use crate::error::{VaultError, VaultResult};
use crate::models::Record;

const BACKEND: &str = "json";

/// Record storage backed by a single JSON file
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStorage for JsonFileStorage {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn read_all(&self) -> VaultResult<Vec<Record>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(VaultError::StorageUnavailable {
                    backend: BACKEND,
                    details: format!("failed to read '{}': {}", self.path.display(), e),
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| VaultError::StorageUnavailable {
            backend: BACKEND,
            details: format!("'{}' is not a valid record file: {}", self.path.display(), e),
        })
    }

    fn write_all(&self, records: &[Record]) -> VaultResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        atomic_write(&self.path, json.as_bytes())
            .map_err(|e| VaultError::from_io(e, self.path.clone(), BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path().join("records.json"));

        assert!(storage.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path().join("records.json"));

        let records = vec![
            Record::new(3, "zulu", "last"),
            Record::new(1, "alpha", "first"),
            Record::new(2, "mike", "middle"),
        ];
        storage.write_all(&records).unwrap();

        assert_eq!(storage.read_all().unwrap(), records);
    }

    #[test]
    fn test_write_replaces_collection() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonFileStorage::new(temp_dir.path().join("records.json"));

        storage
            .write_all(&[Record::new(1, "a", "1"), Record::new(2, "b", "2")])
            .unwrap();
        storage.write_all(&[Record::new(2, "b", "2")]).unwrap();

        let records = storage.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 2);
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("records.json");
        fs::write(&path, "{ not json").unwrap();

        let storage = JsonFileStorage::new(&path);
        assert!(matches!(
            storage.read_all(),
            Err(VaultError::StorageUnavailable { backend: "json", .. })
        ));
    }

    #[test]
    fn test_write_into_file_path_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        // Parent "directory" is a regular file
        let storage = JsonFileStorage::new(blocker.join("records.json"));
        let err = storage.write_all(&[Record::new(1, "a", "b")]).unwrap_err();
        assert!(err.is_storage_error());
    }
}
