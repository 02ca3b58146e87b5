//! Data models for Vault
//!
//! Defines the record entity plus the small value types used by the
//! derived views: sort keys and collection statistics.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::VaultError;

/// Placeholder rendered for statistics that have no value
pub const NOT_AVAILABLE: &str = "N/A";

/// A named key/value vault entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier, assigned by the store
    pub id: u64,
    /// Display label
    pub name: String,
    /// Free-form payload
    pub value: String,
    /// When this record was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    /// When this record was last updated (absent until the first update)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a record stamped with the current time
    pub fn new(id: u64, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            value: value.into(),
            created_date: Some(Utc::now()),
            modified_date: None,
        }
    }

    /// Replace name and value, stamping the modification time
    pub fn apply_update(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.name = name.into();
        self.value = value.into();
        let now = Utc::now();
        // Keep created <= modified even if the clock stepped backwards
        self.modified_date = Some(match self.created_date {
            Some(created) if created > now => created,
            _ => now,
        });
    }

    /// Check that name and value are present
    pub fn validate(name: &str, value: &str) -> Result<(), VaultError> {
        if name.trim().is_empty() {
            return Err(VaultError::validation("Name cannot be empty"));
        }
        if value.trim().is_empty() {
            return Err(VaultError::validation("Value cannot be empty"));
        }
        Ok(())
    }

    /// Whether this record matches a lowercased, trimmed search term
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(term) || self.id.to_string().contains(term)
    }
}

/// Field a sorted view is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Name,
    CreationDate,
}

impl SortField {
    /// Compare two records on this field, ascending
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self {
            SortField::Name => name_key(&a.name).cmp(&name_key(&b.name)),
            // None sorts before any timestamp
            SortField::CreationDate => a.created_date.cmp(&b.created_date),
        }
    }
}

/// Case-insensitive collation key for names
///
/// Compares the accent-stripped letters first, so "Éclair" sorts between
/// "eagle" and "fig". Names equal there are ordered by their decomposed
/// lowercase form, which puts a plain letter before its accented forms.
fn name_key(name: &str) -> (String, String) {
    let lower: String = name.to_lowercase().nfd().collect();
    let base = lower.chars().filter(|c| !is_combining_mark(*c)).collect();
    (base, lower)
}

impl FromStr for SortField {
    type Err = VaultError;

    /// Accepts `Name` and `Creation Date` (or `CreationDate`), any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "creation date" | "creationdate" => Ok(SortField::CreationDate),
            _ => Err(VaultError::validation(format!(
                "Invalid sort field '{}'. Choose Name or Creation Date.",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Name => write!(f, "Name"),
            SortField::CreationDate => write!(f, "Creation Date"),
        }
    }
}

/// Direction of a sorted view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = VaultError;

    /// Accepts `Ascending` or `Descending`, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ascending" => Ok(SortOrder::Ascending),
            "descending" => Ok(SortOrder::Descending),
            _ => Err(VaultError::validation(format!(
                "Invalid sort order '{}'. Choose Ascending or Descending.",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "Ascending"),
            SortOrder::Descending => write!(f, "Descending"),
        }
    }
}

/// Summary of the whole collection
///
/// Serializes missing values as `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_records: usize,
    /// Latest modification, falling back to latest creation
    #[serde(serialize_with = "or_not_available")]
    pub last_modified: Option<DateTime<Utc>>,
    /// First record name of maximal length
    #[serde(serialize_with = "or_not_available")]
    pub longest_name: Option<String>,
    /// Length of `longest_name` in characters
    pub longest_name_length: usize,
    #[serde(serialize_with = "or_not_available")]
    pub earliest_record: Option<NaiveDate>,
    #[serde(serialize_with = "or_not_available")]
    pub latest_record: Option<NaiveDate>,
}

fn or_not_available<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(value) => value.serialize(serializer),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

impl Statistics {
    /// Compute statistics over a collection
    pub fn from_records(records: &[Record]) -> Self {
        let last_modified = records
            .iter()
            .filter_map(|r| r.modified_date)
            .max()
            .or_else(|| records.iter().filter_map(|r| r.created_date).max());

        let mut longest_name: Option<&str> = None;
        let mut longest_name_length = 0;
        for record in records {
            let len = record.name.chars().count();
            if len > longest_name_length {
                longest_name = Some(&record.name);
                longest_name_length = len;
            }
        }

        let created = records.iter().filter_map(|r| r.created_date);
        let earliest_record = created.clone().min().map(|d| d.date_naive());
        let latest_record = created.max().map(|d| d.date_naive());

        Self {
            total_records: records.len(),
            last_modified,
            longest_name: longest_name.map(str::to_string),
            longest_name_length,
            earliest_record,
            latest_record,
        }
    }

    /// Last modification as `YYYY-MM-DD HH:MM:SS`, or `N/A`
    pub fn last_modified_label(&self) -> String {
        self.last_modified
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Longest name, or `N/A`
    pub fn longest_name_label(&self) -> &str {
        self.longest_name.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Earliest creation date as `YYYY-MM-DD`, or `N/A`
    pub fn earliest_record_label(&self) -> String {
        date_label(self.earliest_record)
    }

    /// Latest creation date as `YYYY-MM-DD`, or `N/A`
    pub fn latest_record_label(&self) -> String {
        date_label(self.latest_record)
    }
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
