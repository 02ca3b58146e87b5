//! SQLite backend
//!
//! Each `read_all`/`write_all` call opens its own connection and drops it
//! before returning, so no handle outlives an operation.
//!
//! `write_all` clears and repopulates the `records` table inside a single
//! transaction: either the whole collection is committed or nothing is.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use super::schema::{init_schema, needs_init};
use super::RecordStorage;
use crate::error::{VaultError, VaultResult};
use crate::models::Record;

const BACKEND: &str = "sqlite";

type RawRow = (i64, String, String, Option<String>, Option<String>);

/// Record storage backed by a SQLite database file
pub struct SqliteStorage {
    path: PathBuf,
}

impl SqliteStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection for the duration of one operation
    fn connect(&self) -> VaultResult<Connection> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                unavailable(format!("failed to create directory {:?}: {}", parent, e))
            })?;
        }

        let conn = Connection::open(&self.path).map_err(|e| {
            unavailable(format!("failed to open database at {:?}: {}", self.path, e))
        })?;

        if needs_init(&conn) {
            init_schema(&conn)
                .map_err(|e| unavailable(format!("failed to initialize schema: {}", e)))?;
            debug!("Initialized SQLite schema at {:?}", self.path);
        }

        Ok(conn)
    }
}

impl RecordStorage for SqliteStorage {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn read_all(&self) -> VaultResult<Vec<Record>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, name, value, created_date, modified_date
                 FROM records ORDER BY position",
            )
            .map_err(|e| unavailable(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| -> rusqlite::Result<RawRow> {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .map_err(|e| unavailable(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| unavailable(e.to_string()))?;
            records.push(record_from_row(raw)?);
        }

        Ok(records)
    }

    fn write_all(&self, records: &[Record]) -> VaultResult<()> {
        let mut conn = self.connect()?;

        let tx = conn.transaction().map_err(rejected)?;
        tx.execute("DELETE FROM records", []).map_err(rejected)?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO records (position, id, name, value, created_date, modified_date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(rejected)?;

            for (position, record) in records.iter().enumerate() {
                let id = i64::try_from(record.id).map_err(|_| VaultError::StorageWriteRejected {
                    backend: BACKEND,
                    details: format!("record id {} is out of range", record.id),
                })?;
                stmt.execute(params![
                    position as i64,
                    id,
                    record.name,
                    record.value,
                    record.created_date.map(|d| d.to_rfc3339()),
                    record.modified_date.map(|d| d.to_rfc3339()),
                ])
                .map_err(rejected)?;
            }
        }

        // Dropping an uncommitted transaction rolls it back
        tx.commit().map_err(rejected)?;
        Ok(())
    }
}

fn record_from_row((id, name, value, created, modified): RawRow) -> VaultResult<Record> {
    let id = u64::try_from(id).map_err(|_| unavailable(format!("negative record id {}", id)))?;
    Ok(Record {
        id,
        name,
        value,
        created_date: parse_timestamp(created)?,
        modified_date: parse_timestamp(modified)?,
    })
}

fn parse_timestamp(raw: Option<String>) -> VaultResult<Option<DateTime<Utc>>> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| unavailable(format!("invalid timestamp '{}': {}", s, e)))
    })
    .transpose()
}

fn unavailable(details: String) -> VaultError {
    VaultError::StorageUnavailable {
        backend: BACKEND,
        details,
    }
}

fn rejected(e: rusqlite::Error) -> VaultError {
    VaultError::StorageWriteRejected {
        backend: BACKEND,
        details: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(temp_dir: &TempDir) -> SqliteStorage {
        SqliteStorage::new(temp_dir.path().join("vault.db"))
    }

    #[test]
    fn test_empty_database() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        assert!(storage.read_all().unwrap().is_empty());
        assert!(storage.path().exists());
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let mut edited = Record::new(5, "edited", "v1");
        edited.apply_update("edited", "v2");
        let records = vec![
            Record::new(9, "zulu", "last"),
            edited,
            Record::new(1, "alpha", "first"),
        ];
        storage.write_all(&records).unwrap();

        assert_eq!(storage.read_all().unwrap(), records);
    }

    #[test]
    fn test_write_replaces_collection() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage
            .write_all(&[Record::new(1, "a", "1"), Record::new(2, "b", "2")])
            .unwrap();
        storage.write_all(&[Record::new(2, "b", "2")]).unwrap();

        let records = storage.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "b");
    }

    #[test]
    fn test_failed_write_commits_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let original = vec![Record::new(1, "keep", "me")];
        storage.write_all(&original).unwrap();

        // Duplicate ids violate the UNIQUE constraint mid-transaction
        let bad = vec![Record::new(2, "x", "y"), Record::new(2, "dup", "z")];
        let err = storage.write_all(&bad).unwrap_err();
        assert!(matches!(err, VaultError::StorageWriteRejected { .. }));

        assert_eq!(storage.read_all().unwrap(), original);
    }

    #[test]
    fn test_records_without_dates() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let record = Record {
            id: 4,
            name: "legacy".to_string(),
            value: "x".to_string(),
            created_date: None,
            modified_date: None,
        };
        storage.write_all(std::slice::from_ref(&record)).unwrap();

        assert_eq!(storage.read_all().unwrap(), vec![record]);
    }

    #[test]
    fn test_unreachable_path_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let storage = SqliteStorage::new(blocker.join("vault.db"));
        assert!(matches!(
            storage.read_all(),
            Err(VaultError::StorageUnavailable { .. })
        ));
    }
}
