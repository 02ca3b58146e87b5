//! Vault error handling
//!
//! Provides typed errors for store operations with descriptive messages
//! and recovery suggestions.
//!
//! A missing record is not an error: `update` and `delete` return
//! `Ok(None)` when the id is unknown.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Malformed input (empty name/value, unknown sort field or order)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The persistence backend could not be reached or read
    #[error("Storage unavailable ({backend}): {details}")]
    StorageUnavailable {
        backend: &'static str,
        details: String,
    },

    /// The persistence backend refused the write; nothing was committed
    #[error("Storage rejected write ({backend}): {details}")]
    StorageWriteRejected {
        backend: &'static str,
        details: String,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a backup snapshot
    #[error("Failed to write backup '{path}': {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the export document
    #[error("Failed to write export '{path}': {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Records could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VaultError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        VaultError::Validation(message.into())
    }

    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.).
    /// Anything unclassified becomes a rejected write on the given backend.
    pub fn from_io(error: io::Error, path: PathBuf, backend: &'static str) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => VaultError::PermissionDenied {
                path,
                source: error,
            },
            _ if is_disk_full_error(&error) => VaultError::DiskFull {
                path,
                source: error,
            },
            _ => VaultError::StorageWriteRejected {
                backend,
                details: format!("'{}': {}", path.display(), error),
            },
        }
    }

    /// Check if this error came from the persistence backend
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            VaultError::StorageUnavailable { .. }
                | VaultError::StorageWriteRejected { .. }
                | VaultError::PermissionDenied { .. }
                | VaultError::DiskFull { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            VaultError::DiskFull { .. } => Some("Free up disk space and try again."),
            VaultError::PermissionDenied { .. } => {
                Some("Check file and directory permissions for the vault data directory.")
            }
            VaultError::StorageUnavailable { .. } => {
                Some("Check that the data directory exists and `backend` in the config is correct.")
            }
            VaultError::Validation(_) => Some("Check the command arguments and try again."),
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = VaultError::from_io(io_err, PathBuf::from("/test/path"), "json");

        assert!(matches!(err, VaultError::PermissionDenied { .. }));
        assert!(err.is_storage_error());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = VaultError::from_io(io_err, PathBuf::from("/full/disk"), "json");

        assert!(matches!(err, VaultError::DiskFull { .. }));
    }

    #[test]
    fn test_other_io_is_write_rejected() {
        let io_err = io::Error::new(io::ErrorKind::Other, "device busy");
        let err = VaultError::from_io(io_err, PathBuf::from("/data/records.json"), "json");

        match err {
            VaultError::StorageWriteRejected { backend, details } => {
                assert_eq!(backend, "json");
                assert!(details.contains("records.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_display() {
        let err = VaultError::validation("Name cannot be empty");
        assert_eq!(err.to_string(), "Invalid input: Name cannot be empty");
        assert!(!err.is_storage_error());
    }
}
