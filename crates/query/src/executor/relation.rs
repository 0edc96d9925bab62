//! Relation and RelationEntry types for query execution.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use relish_core::{RecordId, Row, Value};

/// A relation entry wraps one row of an intermediate result.
#[derive(Clone, Debug)]
pub struct RelationEntry {
    /// The underlying row (reference counted for cheap sharing).
    pub row: Rc<Row>,
}

impl RelationEntry {
    /// Creates a new relation entry.
    #[inline]
    pub fn new(row: Rc<Row>) -> Self {
        Self { row }
    }

    /// Creates a relation entry from an owned row.
    pub fn from_row(row: Row) -> Self {
        Self { row: Rc::new(row) }
    }

    /// Returns the record ID of the underlying row.
    pub fn id(&self) -> RecordId {
        self.row.id()
    }

    /// Gets a field value by column index.
    pub fn get_field(&self, index: usize) -> Option<&Value> {
        self.row.get(index)
    }

    /// Combines two entries into a joined entry.
    ///
    /// The combined row carries the concatenated values and a dummy identity,
    /// since it no longer corresponds to a single stored record.
    pub fn combine(left: &RelationEntry, right: &RelationEntry) -> Self {
        let left_values = left.row.values();
        let right_values = right.row.values();

        let mut values = Vec::with_capacity(left_values.len() + right_values.len());
        values.extend(left_values.iter().cloned());
        values.extend(right_values.iter().cloned());

        Self {
            row: Rc::new(Row::dummy(values)),
        }
    }

    /// Combines an entry with nulls on the right side (for outer joins).
    pub fn combine_with_null(left: &RelationEntry, right_column_count: usize) -> Self {
        let left_values = left.row.values();
        let total_len = left_values.len() + right_column_count;

        let mut values = Vec::with_capacity(total_len);
        values.extend(left_values.iter().cloned());
        values.resize(total_len, Value::Null);

        Self {
            row: Rc::new(Row::dummy(values)),
        }
    }
}

/// A relation is an ordered collection of entries with table context.
///
/// The `tables` and `table_column_counts` fields describe how the combined
/// row of each entry is laid out: the i-th table's columns start at the sum
/// of the preceding tables' column counts.
#[derive(Clone, Debug)]
pub struct Relation {
    /// The entries in this relation.
    pub entries: Vec<RelationEntry>,
    /// Table names contributing columns, in layout order.
    pub tables: Vec<String>,
    /// Number of columns each table contributes.
    pub table_column_counts: Vec<usize>,
}

impl Relation {
    /// Creates an empty relation with no table context.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            tables: Vec::new(),
            table_column_counts: Vec::new(),
        }
    }

    /// Creates a single-table relation from rows.
    pub fn from_rows(rows: Vec<Rc<Row>>, table: impl Into<String>, column_count: usize) -> Self {
        let entries = rows.into_iter().map(RelationEntry::new).collect();
        Self {
            entries,
            tables: alloc::vec![table.into()],
            table_column_counts: alloc::vec![column_count],
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the relation has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> core::slice::Iter<'_, RelationEntry> {
        self.entries.iter()
    }

    /// Returns the total column count across all tables.
    pub fn total_columns(&self) -> usize {
        self.table_column_counts.iter().sum()
    }
}

impl IntoIterator for Relation {
    type Item = RelationEntry;
    type IntoIter = alloc::vec::IntoIter<RelationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_from_rows() {
        let rows = vec![
            Rc::new(Row::new(1, vec![Value::Int64(1), Value::String("a".into())])),
            Rc::new(Row::new(2, vec![Value::Int64(2), Value::String("b".into())])),
        ];
        let relation = Relation::from_rows(rows, "team", 2);

        assert_eq!(relation.len(), 2);
        assert_eq!(relation.total_columns(), 2);
        assert_eq!(relation.entries[0].id(), 1);
        assert_eq!(relation.entries[1].get_field(1), Some(&Value::String("b".into())));
    }

    #[test]
    fn test_combine() {
        let left = RelationEntry::from_row(Row::new(1, vec![Value::Int64(1)]));
        let right = RelationEntry::from_row(Row::new(2, vec![Value::String("x".into())]));

        let combined = RelationEntry::combine(&left, &right);
        assert!(combined.row.is_dummy());
        assert_eq!(combined.get_field(0), Some(&Value::Int64(1)));
        assert_eq!(combined.get_field(1), Some(&Value::String("x".into())));
    }

    #[test]
    fn test_combine_with_null() {
        let left = RelationEntry::from_row(Row::new(1, vec![Value::Int64(1)]));
        let combined = RelationEntry::combine_with_null(&left, 2);

        assert_eq!(combined.row.len(), 3);
        assert_eq!(combined.get_field(1), Some(&Value::Null));
        assert_eq!(combined.get_field(2), Some(&Value::Null));
    }
}
