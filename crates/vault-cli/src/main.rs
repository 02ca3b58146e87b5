//! Vault CLI
//!
//! Command-line interface for Vault - a personal record vault.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vault_core::{Config, RecordStore, VaultError};

mod commands;
mod menu;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Vault - personal record vault with automatic backups")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Also log debug detail (backend selection, storage paths)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu
    Menu,
    /// Add a record
    Add {
        /// Record name
        name: String,
        /// Record value
        value: String,
    },
    /// List all records
    #[command(alias = "ls")]
    List,
    /// Replace a record's name and value
    Update {
        /// Record ID
        id: u64,
        /// New name
        name: String,
        /// New value
        value: String,
    },
    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID
        id: u64,
    },
    /// Search records by name or ID
    Search {
        /// Keyword (case-insensitive)
        keyword: String,
    },
    /// Show records in sorted order
    Sort {
        /// Name or "Creation Date"
        field: String,
        /// Ascending or Descending
        #[arg(default_value = "Ascending")]
        order: String,
    },
    /// Export all records to a text file
    Export {
        /// Print the export instead of writing the file
        #[arg(long)]
        stdout: bool,
    },
    /// Show vault statistics
    Stats,
    /// List backup snapshots
    Backups,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, backend, backups_dir, export_file, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = e
            .downcast_ref::<VaultError>()
            .and_then(VaultError::recovery_suggestion)
        {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose, cli.quiet);

    if let Some(Commands::Backups) = &cli.command {
        return commands::record::backups(&config, &output);
    }

    let mut store = RecordStore::open_with_config(&config)?;
    tracing::debug!("Using {} backend", store.backend_name());

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => menu::run(&mut store, &output),
        Commands::Add { name, value } => commands::record::add(&mut store, &name, &value, &output),
        Commands::List => commands::record::list(&store, &output),
        Commands::Update { id, name, value } => {
            commands::record::update(&mut store, id, &name, &value, &output)
        }
        Commands::Delete { id } => commands::record::delete(&mut store, id, &output),
        Commands::Search { keyword } => commands::record::search(&store, &keyword, &output),
        Commands::Sort { field, order } => {
            commands::record::sort(&store, &field, &order, &output)
        }
        Commands::Export { stdout } => commands::record::export(&store, stdout, &output),
        Commands::Stats => commands::record::stats(&store, &output),
        Commands::Backups => unreachable!(), // Handled above
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Filter used when `VAULT_LOG` is unset
///
/// Event and backup notices are logged at info, so they show by default.
fn default_filter(verbose: bool, quiet: bool) -> String {
    let log_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    format!("vault_core={},vault_cli={}", log_level, log_level)
}

/// Initialize logging to the configured log file, or stderr
///
/// `VAULT_LOG` takes a full filter directive and wins over the flags.
fn init_logging(config: &Config, verbose: bool, quiet: bool) {
    let env_filter = EnvFilter::try_from_env("VAULT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore error if already initialized
    match &config.log_file {
        Some(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                    return;
                }
            };
            let _ = builder.with_ansi(false).with_writer(file).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}
