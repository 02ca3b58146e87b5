//! Text export and reports
//!
//! Renders the collection and its statistics as plain text. The layout is
//! stable so exports can be diffed and read back (`parse_total_records`).

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use crate::models::{Record, Statistics, NOT_AVAILABLE};

const RULE: &str = "========================================";

/// Render the export document for a collection
pub fn render_export(records: &[Record], exported_at: DateTime<Local>, filename: &str) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Vault Data Export");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "Export Date/Time: {}",
        exported_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Total Records: {}", records.len());
    let _ = writeln!(out, "Filename: {}", filename);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out);

    if records.is_empty() {
        let _ = writeln!(out, "No records found.");
        return out;
    }

    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(out, "Record {}:", index + 1);
        let _ = writeln!(out, "  ID: {}", record.id);
        let _ = writeln!(out, "  Name: {}", record.name);
        let _ = writeln!(out, "  Value: {}", record.value);
        let _ = writeln!(out, "  Created Date: {}", day(record.created_date));
        if record.modified_date.is_some() {
            let _ = writeln!(out, "  Modified Date: {}", day(record.modified_date));
        }
        let _ = writeln!(out);
    }

    out
}

/// Render the statistics report
pub fn render_statistics(stats: &Statistics) -> String {
    let longest = match stats.longest_name {
        Some(ref name) => format!("{} ({} characters)", name, stats.longest_name_length),
        None => NOT_AVAILABLE.to_string(),
    };

    format!(
        "Vault Statistics:\n\
         --------------------------\n\
         Total Records: {}\n\
         Last Modified: {}\n\
         Longest Name: {}\n\
         Earliest Record: {}\n\
         Latest Record: {}\n",
        stats.total_records,
        stats.last_modified_label(),
        longest,
        stats.earliest_record_label(),
        stats.latest_record_label(),
    )
}

/// Read the record count back out of an export document
pub fn parse_total_records(document: &str) -> Option<usize> {
    document
        .lines()
        .find_map(|line| line.strip_prefix("Total Records: "))
        .and_then(|count| count.trim().parse().ok())
}

fn day(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
