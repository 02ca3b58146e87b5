//! Backup snapshots
//!
//! After every add and delete the store hands the full post-write
//! collection to a `BackupWriter`.
//!
//! `DirectoryBackupWriter` writes one JSON file per snapshot:
//!
//! ```text
//! backups/
//!   backup_2024-03-09_14-02-11.json
//!   backup_2024-03-09_14-02-11_1.json   <- second snapshot in the same second
//! ```
//!
//! Files are never overwritten and never pruned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{VaultError, VaultResult};
use crate::models::Record;
use crate::storage::atomic_write;

const PREFIX: &str = "backup_";
const EXTENSION: &str = "json";

/// Sink for point-in-time copies of the collection
pub trait BackupWriter {
    /// Persist a complete snapshot, returning the artifact name
    fn snapshot(&self, records: &[Record]) -> VaultResult<String>;
}

/// Writes timestamped JSON snapshots into a directory
pub struct DirectoryBackupWriter {
    dir: PathBuf,
}

impl DirectoryBackupWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory snapshots are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a snapshot named after the given instant
    pub fn snapshot_at(&self, records: &[Record], at: DateTime<Local>) -> VaultResult<String> {
        let json = serde_json::to_string_pretty(records)?;

        fs::create_dir_all(&self.dir).map_err(|source| VaultError::Backup {
            path: self.dir.clone(),
            source,
        })?;

        let name = self.free_name(&at.format("%Y-%m-%d_%H-%M-%S").to_string());
        let path = self.dir.join(&name);

        atomic_write(&path, json.as_bytes()).map_err(|source| VaultError::Backup { path, source })?;

        Ok(name)
    }

    /// List snapshot names, oldest first
    pub fn list_backups(&self) -> VaultResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(VaultError::Backup {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| VaultError::Backup {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(PREFIX) && name.ends_with(&format!(".{}", EXTENSION)) {
                names.push(name);
            }
        }

        // Timestamps are zero-padded, but a bare name must sort before its _N siblings
        names.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        Ok(names)
    }

    /// First unused artifact name for a timestamp
    fn free_name(&self, stamp: &str) -> String {
        let mut name = format!("{}{}.{}", PREFIX, stamp, EXTENSION);
        let mut suffix = 1;
        while self.dir.join(&name).exists() {
            name = format!("{}{}_{}.{}", PREFIX, stamp, suffix, EXTENSION);
            suffix += 1;
        }
        name
    }
}

impl BackupWriter for DirectoryBackupWriter {
    fn snapshot(&self, records: &[Record]) -> VaultResult<String> {
        self.snapshot_at(records, Local::now())
    }
}

/// (timestamp, collision suffix) for ordering snapshot names
fn sort_key(name: &str) -> (&str, u32) {
    let stem = name
        .strip_prefix(PREFIX)
        .and_then(|s| s.strip_suffix(".json"))
        .unwrap_or(name);
    // stamp is YYYY-MM-DD_HH-MM-SS, 19 chars
    match stem.get(..19) {
        Some(stamp) => {
            let suffix = stem[19..]
                .strip_prefix('_')
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            (stamp, suffix)
        }
        None => (stem, 0),
    }
}
