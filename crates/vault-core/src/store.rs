//! Record store
//!
//! The `RecordStore` owns the collection and coordinates:
//! - the persistence backend (source of truth)
//! - backup snapshots (after add and delete)
//! - lifecycle events (after every mutation)
//!
//! ## Mutations
//!
//! Each mutation is a full read-modify-write cycle:
//!
//! ```text
//! read_all -> change -> write_all -> snapshot (add/delete) -> publish
//! ```
//!
//! Snapshot and publish only happen once the write has succeeded. A failed
//! snapshot is logged and does not fail the operation. Updates do not take
//! a snapshot.
//!
//! There is no locking: two stores over the same backend race, and the
//! last writer wins.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = RecordStore::open()?;
//!
//! let record = store.add("github", "token-123")?;
//! store.update(record.id, "github", "token-456")?;
//!
//! let hits = store.search("git")?;
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tracing::{debug, info, warn};

use crate::backup::{BackupWriter, DirectoryBackupWriter};
use crate::config::Config;
use crate::error::{VaultError, VaultResult};
use crate::events::{EventListener, EventNotifier, LoggingListener, VaultEvent};
use crate::export::render_export;
use crate::models::{Record, SortField, SortOrder, Statistics};
use crate::storage::{atomic_write, open_backend, RecordStorage};

/// Personal record vault
pub struct RecordStore {
    /// Persistence backend
    storage: Box<dyn RecordStorage>,
    /// Snapshot sink
    backups: Box<dyn BackupWriter>,
    /// Lifecycle listeners
    notifier: EventNotifier,
    /// Where `export_to_file` writes
    export_path: PathBuf,
    /// Highest id handed out by this instance
    last_issued_id: u64,
}

impl RecordStore {
    /// Create a store over explicit components
    ///
    /// No listeners are registered; see `subscribe`.
    pub fn new(storage: Box<dyn RecordStorage>, backups: Box<dyn BackupWriter>) -> Self {
        Self {
            storage,
            backups,
            notifier: EventNotifier::new(),
            export_path: PathBuf::from("export.txt"),
            last_issued_id: 0,
        }
    }

    /// Open the store described by the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(&config)
    }

    /// Open the store with a specific configuration
    ///
    /// Uses the configured backend, writes snapshots to the configured
    /// backups directory and logs every event.
    pub fn open_with_config(config: &Config) -> Result<Self> {
        let storage = open_backend(config);
        let backups = DirectoryBackupWriter::new(config.backups_path());

        // Surface an unreachable backend at startup rather than on first use
        storage
            .read_all()
            .with_context(|| format!("Failed to open {} storage", storage.backend_name()))?;
        debug!(
            "Opened {} storage in {:?}",
            storage.backend_name(),
            config.data_dir
        );

        let mut store =
            Self::new(storage, Box::new(backups)).with_export_path(config.export_path());
        store.subscribe(LoggingListener);
        Ok(store)
    }

    /// Set where `export_to_file` writes
    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    /// Register an event listener
    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.notifier.subscribe(listener);
    }

    /// The listener registry
    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    /// Name of the persistence backend
    pub fn backend_name(&self) -> &'static str {
        self.storage.backend_name()
    }

    /// Path `export_to_file` writes to
    pub fn export_path(&self) -> &Path {
        &self.export_path
    }

    // ==================== Mutations ====================

    /// Add a new record
    pub fn add(&mut self, name: &str, value: &str) -> VaultResult<Record> {
        Record::validate(name, value)?;

        let mut records = self.storage.read_all()?;
        let id = self.next_id(&records);
        let record = Record::new(id, name, value);
        records.push(record.clone());

        self.storage.write_all(&records)?;
        self.snapshot(&records);
        self.notifier.publish(&VaultEvent::RecordAdded(record.clone()));

        Ok(record)
    }

    /// Replace a record's name and value
    ///
    /// Returns `Ok(None)` without writing anything if no record has `id`,
    /// whatever the new fields are. An existing record only accepts a
    /// non-empty name and value. No backup snapshot is taken for updates.
    pub fn update(&mut self, id: u64, name: &str, value: &str) -> VaultResult<Option<Record>> {
        let mut records = self.storage.read_all()?;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        Record::validate(name, value)?;
        record.apply_update(name, value);
        let updated = record.clone();

        self.storage.write_all(&records)?;
        self.notifier.publish(&VaultEvent::RecordUpdated(updated.clone()));

        Ok(Some(updated))
    }

    /// Remove a record
    ///
    /// Returns the removed record, or `Ok(None)` if no record has `id`.
    pub fn delete(&mut self, id: u64) -> VaultResult<Option<Record>> {
        let mut records = self.storage.read_all()?;
        let Some(position) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = records.remove(position);

        self.storage.write_all(&records)?;
        self.snapshot(&records);
        self.notifier.publish(&VaultEvent::RecordDeleted(removed.clone()));

        Ok(Some(removed))
    }

    // ==================== Views ====================

    /// All records in stored order
    pub fn list(&self) -> VaultResult<Vec<Record>> {
        self.storage.read_all()
    }

    /// Records whose name contains `keyword` (case-insensitive) or whose id
    /// contains it, in stored order
    ///
    /// An empty or whitespace-only keyword matches every record.
    pub fn search(&self, keyword: &str) -> VaultResult<Vec<Record>> {
        let term = keyword.trim().to_lowercase();
        let records = self.storage.read_all()?;
        Ok(records.into_iter().filter(|r| r.matches(&term)).collect())
    }

    /// Sorted view from user-supplied field and order names
    ///
    /// Both names are validated before the backend is read.
    pub fn sort(&self, field: &str, order: &str) -> VaultResult<Vec<Record>> {
        let field: SortField = field.parse()?;
        let order: SortOrder = order.parse()?;
        self.sort_by(field, order)
    }

    /// Sorted view of the collection; stored order is untouched
    ///
    /// The sort is stable in both directions: records that compare equal
    /// keep their stored relative order.
    pub fn sort_by(&self, field: SortField, order: SortOrder) -> VaultResult<Vec<Record>> {
        let mut records = self.storage.read_all()?;
        records.sort_by(|a, b| {
            let ordering = field.compare(a, b);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
        Ok(records)
    }

    /// Statistics over the current collection
    pub fn statistics(&self) -> VaultResult<Statistics> {
        let records = self.storage.read_all()?;
        Ok(Statistics::from_records(&records))
    }

    /// Render the export document for the current collection
    pub fn export_to_text(&self) -> VaultResult<String> {
        let records = self.storage.read_all()?;
        Ok(render_export(&records, Local::now(), &self.export_file_name()))
    }

    /// Render the export document and overwrite the export file with it
    pub fn export_to_file(&self) -> VaultResult<PathBuf> {
        let document = self.export_to_text()?;
        atomic_write(&self.export_path, document.as_bytes()).map_err(|source| {
            VaultError::Export {
                path: self.export_path.clone(),
                source,
            }
        })?;
        info!("Exported records to {:?}", self.export_path);
        Ok(self.export_path.clone())
    }

    // ==================== Internals ====================

    /// Pick an id that is unused now and was never issued before
    ///
    /// Floored by wall-clock milliseconds so ids keep growing across
    /// sessions even after the highest record is deleted.
    fn next_id(&mut self, records: &[Record]) -> u64 {
        let max_stored = records.iter().map(|r| r.id).max().unwrap_or(0);
        let clock = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = max_stored
            .saturating_add(1)
            .max(self.last_issued_id.saturating_add(1))
            .max(clock);
        self.last_issued_id = id;
        id
    }

    /// Best-effort backup of the post-write collection
    fn snapshot(&self, records: &[Record]) {
        match self.backups.snapshot(records) {
            Ok(name) => info!("Backup created: {}", name),
            Err(e) => warn!("Backup failed, primary store is unaffected: {}", e),
        }
    }

    fn export_file_name(&self) -> String {
        self.export_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.export_path.display().to_string())
    }
}
