//! Storage layer
//!
//! The persistence port and its backends.
//!
//! ## Contract
//!
//! - `read_all` returns the whole collection, in stored order
//! - `write_all` replaces the whole collection; there is no partial write
//!
//! The store always passes the complete intended state to `write_all`.
//!
//! ## Backends
//!
//! - **SQLite**: `records` table, one connection per call
//! - **JSON**: a single pretty-printed array, written atomically
//! - **Memory**: in-process, for tests and embedding

pub mod json;
pub mod memory;
pub mod schema;
pub mod sqlite;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

pub use json::JsonFileStorage;
pub use memory::MemoryStorage;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteStorage;

use crate::config::{Config, StorageBackend};
use crate::error::VaultResult;
use crate::models::Record;

/// Read-all/write-all persistence port over the record collection
pub trait RecordStorage {
    /// Short backend name, used in errors and logs
    fn backend_name(&self) -> &'static str;

    /// Read the full collection in stored order
    fn read_all(&self) -> VaultResult<Vec<Record>>;

    /// Replace the full collection
    fn write_all(&self, records: &[Record]) -> VaultResult<()>;
}

/// Build the backend selected in the configuration
pub fn open_backend(config: &Config) -> Box<dyn RecordStorage> {
    match config.backend {
        StorageBackend::Sqlite => Box::new(SqliteStorage::new(config.sqlite_path())),
        StorageBackend::Json => Box::new(JsonFileStorage::new(config.json_path())),
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "test data");
        assert!(!nested_path.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file.txt");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_open_backend_follows_config() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        assert_eq!(open_backend(&config).backend_name(), "sqlite");

        config.backend = StorageBackend::Json;
        assert_eq!(open_backend(&config).backend_name(), "json");
    }
}
