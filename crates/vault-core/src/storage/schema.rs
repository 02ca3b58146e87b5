//! SQLite schema for the record store
//!
//! One `records` table. The `position` column carries stored order,
//! since the collection is returned in the order it was written.

use rusqlite::{Connection, Result};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Records table
        CREATE TABLE IF NOT EXISTS records (
            position INTEGER PRIMARY KEY,
            id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            created_date TEXT,
            modified_date TEXT
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Check if the schema needs to be initialized
pub fn needs_init(conn: &Connection) -> bool {
    let result: Result<String> = conn.query_row(
        "SELECT value FROM schema_info WHERE key = 'version'",
        [],
        |row| row.get(0),
    );

    match result {
        Ok(version) => version.parse::<i32>().unwrap_or(0) < SCHEMA_VERSION,
        Err(_) => true,
    }
}
