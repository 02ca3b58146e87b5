//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use vault_core::Config;

use crate::output::{Output, OutputFormat};

/// Print the effective settings
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend": config.backend.to_string(),
                    "backups_dir": config.backups_path(),
                    "export_file": config.export_path(),
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:    {}", config.data_dir.display());
            println!("  backend:     {}", config.backend);
            println!("  backups_dir: {}", config.backups_path().display());
            println!("  export_file: {}", config.export_path().display());
            println!(
                "  log_file:    {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Change one key and save the file it came from
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    match config_path {
        Some(path) => config.save_to_path(path)?,
        None => config.save()?,
    }

    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

/// `none` or an empty value clears optional keys
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let cleared = value.is_empty() || value == "none";
    match key {
        "data_dir" => config.data_dir = value.into(),
        "backend" => config.backend = value.parse()?,
        "backups_dir" => {
            config.backups_dir = if cleared { None } else { Some(value.into()) };
        }
        "export_file" => {
            if cleared {
                bail!("export_file cannot be empty");
            }
            config.export_file = value.to_string();
        }
        "log_file" => {
            config.log_file = if cleared { None } else { Some(value.into()) };
        }
        _ => bail!(
            "Unknown config key: {}. Valid keys: data_dir, backend, backups_dir, export_file, log_file",
            key
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::StorageBackend;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "backend", "json").unwrap();
        apply(&mut config, "backups_dir", "/srv/backups").unwrap();
        apply(&mut config, "export_file", "dump.txt").unwrap();

        assert_eq!(config.backend, StorageBackend::Json);
        assert_eq!(config.backups_dir, Some(PathBuf::from("/srv/backups")));
        assert_eq!(config.export_file, "dump.txt");

        apply(&mut config, "backups_dir", "none").unwrap();
        assert!(config.backups_dir.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();

        assert!(apply(&mut config, "colour", "blue").is_err());
        assert!(apply(&mut config, "backend", "mongodb").is_err());
        assert!(apply(&mut config, "export_file", "").is_err());
    }
}
