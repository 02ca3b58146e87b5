//! Vault Core Library
//!
//! This crate provides the core functionality for Vault, a personal
//! record vault: named key/value entries with automatic backups and
//! lifecycle events.
//!
//! # Architecture
//!
//! - **Storage**: read-all/write-all port; SQLite or JSON file on disk
//! - **Backups**: a timestamped JSON snapshot after every add and delete
//! - **Events**: listeners notified synchronously after each mutation
//!
//! Search, sort, statistics and export are computed from a fresh read of
//! the collection and never write.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = RecordStore::open()?;
//!
//! let record = store.add("wifi", "hunter2")?;
//! let sorted = store.sort("Name", "Ascending")?;
//! println!("{}", store.export_to_text()?);
//! ```
//!
//! # Modules
//!
//! - `store`: The record store (main entry point)
//! - `models`: Record, sort keys and statistics
//! - `storage`: Persistence port and backends
//! - `backup`: Snapshot writer
//! - `events`: Listener registry
//! - `export`: Text rendering
//! - `config`: Application configuration
//! - `error`: Error types

pub mod backup;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod models;
pub mod storage;
pub mod store;

pub use backup::{BackupWriter, DirectoryBackupWriter};
pub use config::{Config, StorageBackend};
pub use error::{VaultError, VaultResult};
pub use events::{EventListener, EventNotifier, LoggingListener, VaultEvent};
pub use export::{parse_total_records, render_export, render_statistics};
pub use models::{Record, SortField, SortOrder, Statistics};
pub use storage::{JsonFileStorage, MemoryStorage, RecordStorage, SqliteStorage};
pub use store::RecordStore;
