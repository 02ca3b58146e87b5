//! In-memory backend
//!
//! Clones share the same collection, so a caller can keep a handle after
//! moving one into a `RecordStore`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::RecordStorage;
use crate::error::VaultResult;
use crate::models::Record;

/// Record storage held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Rc<RefCell<Vec<Record>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Rc::new(RefCell::new(records)),
            writes: Rc::default(),
        }
    }

    /// Number of `write_all` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl RecordStorage for MemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn read_all(&self) -> VaultResult<Vec<Record>> {
        Ok(self.records.borrow().clone())
    }

    fn write_all(&self, records: &[Record]) -> VaultResult<()> {
        *self.records.borrow_mut() = records.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
