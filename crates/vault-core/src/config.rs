//! Vault configuration
//!
//! Settings are layered, later layers winning:
//! defaults, then `config.toml` (under the platform config dir, or
//! `VAULT_CONFIG`), then `VAULT_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix shared by every override variable
const ENV_PREFIX: &str = "VAULT";

/// Concrete persistence backend behind the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file
    #[default]
    Sqlite,
    /// Single JSON document
    Json,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "json" => Ok(StorageBackend::Json),
            other => anyhow::bail!("Unknown backend '{}'. Use sqlite or json.", other),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Json => write!(f, "json"),
        }
    }
}

/// Where the vault keeps its data and how it is stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (database, export, backups)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Which persistence backend to use
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for backup snapshots (defaults to `<data_dir>/backups`)
    #[serde(default)]
    pub backups_dir: Option<PathBuf>,

    /// Export file name, relative to `data_dir` unless absolute
    #[serde(default = "default_export_file")]
    pub export_file: String,

    /// Log file path (logs go to stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: StorageBackend::default(),
            backups_dir: None,
            export_file: default_export_file(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load the config file at its usual location, then env overrides
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load `path` (defaults when it is missing), then env overrides
    ///
    /// Creates the data directory.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Parse TOML text and apply env overrides; nothing is created
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Overlay `VAULT_*` variables
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_BACKEND", ENV_PREFIX)) {
            self.backend = val
                .parse()
                .with_context(|| format!("Invalid {}_BACKEND", ENV_PREFIX))?;
        }

        // Empty means "use the default location"
        if let Ok(val) = std::env::var(format!("{}_BACKUPS_DIR", ENV_PREFIX)) {
            self.backups_dir = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Ok(val) = std::env::var(format!("{}_EXPORT_FILE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.export_file = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        Ok(())
    }

    /// Create the data directory if needed
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Write to the usual config file location
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Write as TOML to `config_path`, creating parent directories
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// `VAULT_CONFIG`, else `<config dir>/vault/config.toml`
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vault")
            .join("config.toml")
    }

    /// SQLite database file
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("vault.db")
    }

    /// JSON document backend file
    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join("records.json")
    }

    /// Directory receiving backup snapshots
    pub fn backups_path(&self) -> PathBuf {
        self.backups_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("backups"))
    }

    /// Text export target
    pub fn export_path(&self) -> PathBuf {
        // join() keeps absolute export paths as-is
        self.data_dir.join(&self.export_file)
    }
}

/// `<local data dir>/vault`
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vault")
}

fn default_export_file() -> String {
    "export.txt".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "VAULT_DATA_DIR",
        "VAULT_BACKEND",
        "VAULT_BACKUPS_DIR",
        "VAULT_EXPORT_FILE",
        "VAULT_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert!(config.backups_dir.is_none());
        assert_eq!(config.export_file, "export.txt");
        assert!(config.data_dir.ends_with("vault"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config {
            data_dir: PathBuf::from("/data/vault"),
            ..Config::default()
        };

        assert_eq!(config.sqlite_path(), PathBuf::from("/data/vault/vault.db"));
        assert_eq!(config.json_path(), PathBuf::from("/data/vault/records.json"));
        assert_eq!(config.backups_path(), PathBuf::from("/data/vault/backups"));
        assert_eq!(config.export_path(), PathBuf::from("/data/vault/export.txt"));
    }

    #[test]
    fn test_explicit_backups_dir() {
        let config = Config {
            backups_dir: Some(PathBuf::from("/mnt/backups")),
            ..Config::default()
        };
        assert_eq!(config.backups_path(), PathBuf::from("/mnt/backups"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("VAULT_DATA_DIR", "/tmp/vault-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/vault-test"));
    }

    #[test]
    fn test_env_override_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("VAULT_BACKEND", "JSON");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.backend, StorageBackend::Json);

        env::set_var("VAULT_BACKEND", "mongodb");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_backups_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("VAULT_BACKUPS_DIR", "/srv/snapshots");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.backups_dir, Some(PathBuf::from("/srv/snapshots")));

        env::set_var("VAULT_BACKUPS_DIR", "");
        config.apply_env_overrides().unwrap();
        assert!(config.backups_dir.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/vault"),
            backend: StorageBackend::Json,
            backups_dir: Some(PathBuf::from("/data/snapshots")),
            export_file: "dump.txt".to_string(),
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("backend = \"json\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.backend, config.backend);
        assert_eq!(parsed.backups_dir, config.backups_dir);
        assert_eq!(parsed.export_file, config.export_file);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            backend = "json"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.backend, StorageBackend::Json);
        assert_eq!(config.export_file, "export.txt");
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("VAULT_DATA_DIR", temp_dir.path().join("data"));

        let config = Config::load_from_path(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.backend, StorageBackend::Sqlite);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            backend: StorageBackend::Json,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.backend, StorageBackend::Json);
    }
}
