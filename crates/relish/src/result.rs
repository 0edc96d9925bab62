//! Query result decoding.

use alloc::string::String;
use alloc::vec::Vec;
use relish_core::{Result, Value};

/// One table's slice of a projected result row.
#[derive(Clone, Debug)]
pub struct LayoutEntry {
    /// Table the slice came from.
    pub table: String,
    /// Offset of the slice in the projected row.
    pub offset: usize,
    /// Number of columns in the slice.
    pub len: usize,
    /// Whether the slice was materialized by a fetch join.
    pub fetched: bool,
}

/// Layout of a projected result row: which tables contributed which column
/// ranges.
#[derive(Clone, Debug, Default)]
pub struct ResultLayout {
    entries: Vec<LayoutEntry>,
}

impl ResultLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a table slice to the layout.
    pub fn push(&mut self, table: impl Into<String>, len: usize, fetched: bool) {
        let offset = self.entries.iter().map(|e| e.len).sum();
        self.entries.push(LayoutEntry {
            table: table.into(),
            offset,
            len,
            fetched,
        });
    }

    /// Finds the slice contributed by a table.
    pub fn entry(&self, table: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|e| e.table == table)
    }

    /// Total number of projected columns.
    pub fn width(&self) -> usize {
        self.entries.iter().map(|e| e.len).sum()
    }
}

/// Decodes a typed result from a projected row.
pub trait FromRow: Sized {
    fn from_row(values: &[Value], layout: &ResultLayout) -> Result<Self>;
}

/// An untyped projected row, produced by explicit field selections.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    /// Gets a value by projection position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the projected values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of projected values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was projected.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromRow for Tuple {
    fn from_row(values: &[Value], _layout: &ResultLayout) -> Result<Self> {
        Ok(Self {
            values: values.to_vec(),
        })
    }
}

/// A page of results together with the unpaged total.
///
/// `total` counts every row the query matches, ignoring offset and limit;
/// `results` holds only the requested page.
#[derive(Clone, Debug)]
pub struct QueryResults<R> {
    /// The rows of the requested page.
    pub results: Vec<R>,
    /// Total matching rows, ignoring paging.
    pub total: usize,
    /// The limit the page was fetched with.
    pub limit: Option<usize>,
    /// The offset the page was fetched with.
    pub offset: usize,
}
