//! Catalog management for the Relish engine.
//!
//! This module provides the `Catalog` struct which manages the record stores
//! of all registered tables.

use crate::record_store::RecordStore;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use relish_core::schema::Table;
use relish_core::{Error, RecordId, Result, Row};

/// Catalog of record stores, one per registered table.
pub struct Catalog {
    /// Table name to store mapping.
    tables: BTreeMap<String, RecordStore>,
}

impl Catalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Registers a table in the catalog.
    pub fn create_table(&mut self, schema: Table) -> Result<()> {
        let name = schema.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(Error::invalid_schema(format!(
                "Table already exists: {}",
                name
            )));
        }
        self.tables.insert(name, RecordStore::new(schema));
        Ok(())
    }

    /// Gets a reference to a table store.
    pub fn get_table(&self, name: &str) -> Option<&RecordStore> {
        self.tables.get(name)
    }

    /// Gets a mutable reference to a table store.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut RecordStore> {
        self.tables.get_mut(name)
    }

    /// Gets a table store, erroring if the table is not registered.
    pub fn require_table(&self, name: &str) -> Result<&RecordStore> {
        self.tables.get(name).ok_or_else(|| Error::table_not_found(name))
    }

    /// Gets a mutable table store, erroring if the table is not registered.
    pub fn require_table_mut(&mut self, name: &str) -> Result<&mut RecordStore> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    /// Checks if a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns all table names.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }

    /// Gets a committed row by table name and record identity.
    pub fn get_row(&self, table: &str, id: RecordId) -> Option<Rc<Row>> {
        self.tables.get(table).and_then(|t| t.get(id))
    }

    /// Commits staged rows across all tables.
    pub fn flush_all(&mut self) -> Result<()> {
        for store in self.tables.values_mut() {
            store.flush()?;
        }
        Ok(())
    }

    /// Discards staged rows across all tables.
    pub fn discard_staged(&mut self) {
        for store in self.tables.values_mut() {
            store.discard_staged();
        }
    }

    /// Returns the number of staged rows across all tables.
    pub fn staged_count(&self) -> usize {
        self.tables.values().map(|t| t.staged_count()).sum()
    }

    /// Clears all tables, staged and committed rows alike.
    pub fn clear(&mut self) {
        for store in self.tables.values_mut() {
            store.clear();
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
