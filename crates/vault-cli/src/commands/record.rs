//! Record command handlers

use anyhow::{bail, Context, Result};

use vault_core::{Config, DirectoryBackupWriter, RecordStore};

use crate::output::Output;

/// Add a new record
pub fn add(store: &mut RecordStore, name: &str, value: &str, output: &Output) -> Result<()> {
    let record = store.add(name, value).context("Failed to add record")?;

    output.success(&format!("Record added: {}", record.id));
    output.print_record(&record);
    Ok(())
}

/// List all records in stored order
pub fn list(store: &RecordStore, output: &Output) -> Result<()> {
    let records = store.list().context("Failed to list records")?;
    output.print_records(&records);
    Ok(())
}

/// Replace a record's name and value
pub fn update(
    store: &mut RecordStore,
    id: u64,
    name: &str,
    value: &str,
    output: &Output,
) -> Result<()> {
    let Some(record) = store
        .update(id, name, value)
        .context("Failed to update record")?
    else {
        bail!("Record not found: {}", id);
    };

    output.success(&format!("Record updated: {}", record.id));
    output.print_record(&record);
    Ok(())
}

/// Delete a record
pub fn delete(store: &mut RecordStore, id: u64, output: &Output) -> Result<()> {
    let Some(record) = store.delete(id).context("Failed to delete record")? else {
        bail!("Record not found: {}", id);
    };

    output.success(&format!("Record deleted: {} ({})", record.id, record.name));
    Ok(())
}

/// Search records by name or id
pub fn search(store: &RecordStore, keyword: &str, output: &Output) -> Result<()> {
    let results = store.search(keyword).context("Failed to search records")?;
    output.print_ranked(
        &results,
        &format!("Found {} matching record(s):", results.len()),
    );
    Ok(())
}

/// Show a sorted view of the records
pub fn sort(store: &RecordStore, field: &str, order: &str, output: &Output) -> Result<()> {
    let sorted = store.sort(field, order).context("Failed to sort records")?;
    output.print_ranked(&sorted, "Sorted Records:");
    Ok(())
}

/// Write the export file, or print the document
pub fn export(store: &RecordStore, to_stdout: bool, output: &Output) -> Result<()> {
    if to_stdout {
        print!("{}", store.export_to_text().context("Failed to export records")?);
        return Ok(());
    }

    let path = store.export_to_file().context("Failed to export records")?;
    output.success(&format!("Data exported successfully to {}", path.display()));
    Ok(())
}

/// Show vault statistics
pub fn stats(store: &RecordStore, output: &Output) -> Result<()> {
    let stats = store.statistics().context("Failed to compute statistics")?;
    output.print_statistics(&stats);
    Ok(())
}

/// List backup snapshots
pub fn backups(config: &Config, output: &Output) -> Result<()> {
    let writer = DirectoryBackupWriter::new(config.backups_path());
    let names = writer.list_backups().context("Failed to list backups")?;
    output.print_backups(&names);
    Ok(())
}
