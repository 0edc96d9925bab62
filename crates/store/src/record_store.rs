//! Record storage for the Relish engine.
//!
//! This module provides the `RecordStore` struct which manages the records of
//! a single table: identity allocation, staged writes, and committed rows.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use relish_core::schema::Table;
use relish_core::{Error, RecordId, Result, Row};

/// Per-table record storage.
///
/// Rows are kept in identity order, so a scan returns records in the order
/// they were first assigned an identity. Writes can be staged and made
/// visible to scans only on `flush`, mirroring a unit-of-work write buffer.
#[derive(Debug)]
pub struct RecordStore {
    /// Table schema.
    schema: Table,
    /// Committed rows, keyed by record identity.
    rows: BTreeMap<RecordId, Rc<Row>>,
    /// Staged rows awaiting a flush.
    staged: Vec<Row>,
    /// Next identity to hand out.
    next_id: RecordId,
}

impl RecordStore {
    /// Creates a new empty store for the given schema.
    pub fn new(schema: Table) -> Self {
        Self {
            schema,
            rows: BTreeMap::new(),
            staged: Vec::new(),
            next_id: 1,
        }
    }

    /// Returns the table schema.
    #[inline]
    pub fn schema(&self) -> &Table {
        &self.schema
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Allocates the next record identity.
    pub fn allocate_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Inserts a committed row directly.
    ///
    /// Returns `DuplicateInsert` if a row with the same identity is already
    /// present. Keeps the identity counter ahead of explicitly chosen ids.
    pub fn insert(&mut self, row: Row) -> Result<()> {
        let id = row.id();
        if self.rows.contains_key(&id) {
            return Err(Error::duplicate_insert(self.schema.name(), id));
        }
        if id >= self.next_id {
            self.next_id = id + 1;
        }
        self.rows.insert(id, Rc::new(row));
        Ok(())
    }

    /// Stages a row to be committed on the next flush.
    ///
    /// Returns `DuplicateInsert` if a row with the same identity is already
    /// committed or staged, so the caller fails before anything is buffered.
    pub fn stage(&mut self, row: Row) -> Result<()> {
        let id = row.id();
        if self.rows.contains_key(&id) || self.staged.iter().any(|r| r.id() == id) {
            return Err(Error::duplicate_insert(self.schema.name(), id));
        }
        self.staged.push(row);
        Ok(())
    }

    /// Commits all staged rows, making them visible to scans.
    ///
    /// On a failed insert the rows staged after the failing one are put
    /// back, so an error does not lose them.
    pub fn flush(&mut self) -> Result<()> {
        let staged = core::mem::take(&mut self.staged);
        let mut pending = staged.into_iter();
        while let Some(row) = pending.next() {
            if let Err(err) = self.insert(row) {
                self.staged = pending.collect();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Discards all staged rows without committing them.
    pub fn discard_staged(&mut self) {
        self.staged.clear();
    }

    /// Returns the number of staged rows.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Gets a committed row by identity.
    pub fn get(&self, id: RecordId) -> Option<Rc<Row>> {
        self.rows.get(&id).cloned()
    }

    /// Gets a committed row by identity, erroring if absent.
    pub fn get_required(&self, id: RecordId) -> Result<Rc<Row>> {
        self.get(id)
            .ok_or_else(|| Error::not_found(self.schema.name(), id))
    }

    /// Returns all committed rows in identity order.
    pub fn scan(&self) -> Vec<Rc<Row>> {
        self.rows.values().cloned().collect()
    }

    /// Returns the number of committed rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the store holds no committed rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes all rows, staged and committed, and resets identity allocation.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.staged.clear();
        self.next_id = 1;
    }
}
