//! Interactive menu
//!
//! A numbered text menu over the same store operations as the
//! subcommands. Errors from an operation are printed and the menu keeps
//! running; end of input exits like option 9.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use vault_core::{RecordStore, SortField, SortOrder};

use crate::output::Output;

const MENU: &str = "
===== Vault =====
1. Add Record
2. List Records
3. Update Record
4. Delete Record
5. Search Records
6. Sort Records
7. Export Data
8. View Vault Statistics
9. Exit
=================";

/// Run the menu against stdin
pub fn run(store: &mut RecordStore, output: &Output) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    run_with_input(store, output, &mut input)
}

/// Run the menu reading answers from `input`
pub fn run_with_input<R: BufRead>(
    store: &mut RecordStore,
    output: &Output,
    input: &mut R,
) -> Result<()> {
    loop {
        println!("{}", MENU);
        let Some(choice) = prompt(input, "Choose option: ")? else {
            break;
        };

        match choice.trim() {
            "1" => add(store, input)?,
            "2" => report(store.list().map(|records| output.print_records(&records))),
            "3" => update(store, input)?,
            "4" => delete(store, input)?,
            "5" => {
                let Some(keyword) = prompt(input, "Enter search keyword: ")? else {
                    break;
                };
                report(store.search(&keyword).map(|results| {
                    output.print_ranked(
                        &results,
                        &format!("Found {} matching record(s):", results.len()),
                    )
                }));
            }
            "6" => sort(store, output, input)?,
            "7" => report(
                store
                    .export_to_file()
                    .map(|path| println!("✅ Data exported successfully to {}", path.display())),
            ),
            "8" => report(store.statistics().map(|stats| output.print_statistics(&stats))),
            "9" => break,
            _ => println!("Invalid option."),
        }
    }

    println!("👋 Exiting Vault...");
    Ok(())
}

fn add<R: BufRead>(store: &mut RecordStore, input: &mut R) -> Result<()> {
    let Some(name) = prompt(input, "Enter name: ")? else {
        return Ok(());
    };
    let Some(value) = prompt(input, "Enter value: ")? else {
        return Ok(());
    };

    report(
        store
            .add(&name, &value)
            .map(|record| println!("✅ Record added successfully! (ID: {})", record.id)),
    );
    Ok(())
}

fn update<R: BufRead>(store: &mut RecordStore, input: &mut R) -> Result<()> {
    let Some(id) = prompt(input, "Enter record ID to update: ")? else {
        return Ok(());
    };
    let Some(name) = prompt(input, "New name: ")? else {
        return Ok(());
    };
    let Some(value) = prompt(input, "New value: ")? else {
        return Ok(());
    };

    let Ok(id) = id.trim().parse::<u64>() else {
        println!("❌ Record not found.");
        return Ok(());
    };

    report(store.update(id, &name, &value).map(|updated| match updated {
        Some(_) => println!("✅ Record updated!"),
        None => println!("❌ Record not found."),
    }));
    Ok(())
}

fn delete<R: BufRead>(store: &mut RecordStore, input: &mut R) -> Result<()> {
    let Some(id) = prompt(input, "Enter record ID to delete: ")? else {
        return Ok(());
    };

    let Ok(id) = id.trim().parse::<u64>() else {
        println!("❌ Record not found.");
        return Ok(());
    };

    report(store.delete(id).map(|deleted| match deleted {
        Some(_) => println!("🗑️ Record deleted!"),
        None => println!("❌ Record not found."),
    }));
    Ok(())
}

fn sort<R: BufRead>(store: &RecordStore, output: &Output, input: &mut R) -> Result<()> {
    let Some(field) = prompt(input, "Choose field to sort by (Name/Creation Date): ")? else {
        return Ok(());
    };
    let field = match field.parse::<SortField>() {
        Ok(field) => field,
        Err(e) => {
            println!("❌ {}", e);
            return Ok(());
        }
    };

    let Some(order) = prompt(input, "Choose order (Ascending/Descending): ")? else {
        return Ok(());
    };
    let order = match order.parse::<SortOrder>() {
        Ok(order) => order,
        Err(e) => {
            println!("❌ {}", e);
            return Ok(());
        }
    };

    report(
        store
            .sort_by(field, order)
            .map(|sorted| output.print_ranked(&sorted, "Sorted Records:")),
    );
    Ok(())
}

/// Print a failed operation and carry on
fn report<E: std::fmt::Display>(result: Result<(), E>) {
    if let Err(e) = result {
        println!("❌ Error: {}", e);
    }
}

/// Ask for one line; `None` at end of input
fn prompt<R: BufRead>(input: &mut R, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use vault_core::{MemoryStorage, Record, RecordStorage, VaultResult};

    use crate::output::OutputFormat;

    struct NoBackups;

    impl vault_core::BackupWriter for NoBackups {
        fn snapshot(&self, _records: &[Record]) -> VaultResult<String> {
            Ok("none".to_string())
        }
    }

    fn store(storage: &MemoryStorage) -> RecordStore {
        RecordStore::new(Box::new(storage.clone()), Box::new(NoBackups))
    }

    fn run_script(store: &mut RecordStore, script: &str) {
        let output = Output::new(OutputFormat::Human);
        let mut input = Cursor::new(script.as_bytes().to_vec());
        run_with_input(store, &output, &mut input).unwrap();
    }

    #[test]
    fn test_add_then_exit() {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);

        run_script(&mut store, "1\nAlpha\n1\n1\nbeta\n2\n9\n");

        let records = storage.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alpha");
        assert_eq!(records[1].value, "2");
    }

    #[test]
    fn test_update_and_delete() {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);
        let keep = store.add("keep", "1").unwrap();
        let gone = store.add("gone", "2").unwrap();

        let script = format!("3\n{}\nkept\n9\n4\n{}\n9\n", keep.id, gone.id);
        run_script(&mut store, &script);

        let records = storage.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "kept");
        assert_eq!(records[0].value, "9");
    }

    #[test]
    fn test_errors_do_not_stop_menu() {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);

        // Empty name, bad id, bad sort field, unknown option, then a valid add
        run_script(&mut store, "1\n\nx\n4\nabc\n6\nValue\n42\n1\nok\nv\n");

        let records = storage.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "ok");
    }

    #[test]
    fn test_end_of_input_exits() {
        let storage = MemoryStorage::new();
        let mut store = store(&storage);

        run_script(&mut store, "1\nhalf");
        run_script(&mut store, "");

        assert!(storage.read_all().unwrap().is_empty());
    }
}
