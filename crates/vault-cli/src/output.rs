//! Rendering of command results
//!
//! Every command prints through `Output`, so `--json` and `--quiet`
//! behave the same everywhere. Quiet mode prints bare ids.

use vault_core::{render_statistics, Record, Statistics};

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text for a terminal
    Human,
    /// Pretty-printed JSON
    Json,
    /// Ids and counts only
    Quiet,
}

impl OutputFormat {
    /// `--quiet` wins over `--json`
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Printer shared by the commands
pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single record
    pub fn print_record(&self, record: &Record) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", record.id);
                println!("Name:     {}", record.name);
                println!("Value:    {}", record.value);
                println!("Created:  {}", timestamp(record.created_date));
                if record.modified_date.is_some() {
                    println!("Modified: {}", timestamp(record.modified_date));
                }
            }
            OutputFormat::Json => print_json(record),
            OutputFormat::Quiet => println!("{}", record.id),
        }
    }

    /// Print a list of records
    pub fn print_records(&self, records: &[Record]) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No records found.");
                    return;
                }
                for record in records {
                    println!(
                        "ID: {} | Name: {} | Value: {}",
                        record.id,
                        truncate(&record.name, 30),
                        truncate(&record.value, 40)
                    );
                }
                println!("\n{} record(s)", records.len());
            }
            OutputFormat::Json => print_json(&records),
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.id);
                }
            }
        }
    }

    /// Print numbered results with their creation day
    pub fn print_ranked(&self, records: &[Record], header: &str) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No records found.");
                    return;
                }
                println!("{}", header);
                for (index, record) in records.iter().enumerate() {
                    println!(
                        "{}. ID: {} | Name: {} | Created: {}",
                        index + 1,
                        record.id,
                        record.name,
                        record
                            .created_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "N/A".to_string())
                    );
                }
            }
            _ => self.print_records(records),
        }
    }

    /// Print vault statistics
    pub fn print_statistics(&self, stats: &Statistics) {
        match self.format {
            OutputFormat::Human => print!("{}", render_statistics(stats)),
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => println!("{}", stats.total_records),
        }
    }

    /// Print backup artifact names
    pub fn print_backups(&self, names: &[String]) {
        match self.format {
            OutputFormat::Human => {
                if names.is_empty() {
                    println!("No backups found.");
                    return;
                }
                for name in names {
                    println!("{}", name);
                }
                println!("\n{} backup(s)", names.len());
            }
            OutputFormat::Json => print_json(&names),
            OutputFormat::Quiet => {
                for name in names {
                    println!("{}", name);
                }
            }
        }
    }

    /// Confirm a completed change
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn timestamp(date: Option<chrono::DateTime<chrono::Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Cut to `max_len` characters including a trailing "..."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
