//! Row structure for the Relish engine.
//!
//! This module defines the `Row` struct which carries a record's field values
//! together with its store-assigned identity.

use crate::value::Value;
use alloc::vec::Vec;

/// Unique identifier for a stored record.
pub type RecordId = u64;

/// A dummy record ID used for rows that don't correspond to a stored record
/// (e.g., the result of joining two rows or a projected tuple).
pub const DUMMY_RECORD_ID: RecordId = u64::MAX;

/// A row holding the field values of a record.
#[derive(Clone, Debug)]
pub struct Row {
    /// Identity of the record this row belongs to.
    id: RecordId,
    /// Values stored in this row, indexed by column position.
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given ID and values.
    pub fn new(id: RecordId, values: Vec<Value>) -> Self {
        Self { id, values }
    }

    /// Creates a dummy row (for join results, projections, etc.).
    pub fn dummy(values: Vec<Value>) -> Self {
        Self::new(DUMMY_RECORD_ID, values)
    }

    /// Returns the record ID.
    #[inline]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Sets the record ID.
    pub fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns a mutable reference to the values.
    #[inline]
    pub fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    /// Consumes the row and returns its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Gets a value at the given column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets a value at the given column index.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        if index < self.values.len() {
            self.values[index] = value;
            true
        } else {
            false
        }
    }

    /// Returns the number of values in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if this is a dummy row.
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.id == DUMMY_RECORD_ID
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_row_new() {
        let row = Row::new(1, vec![Value::Int64(42), Value::String("Alice".into())]);
        assert_eq!(row.id(), 1);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_row_get_value() {
        let row = Row::new(1, vec![Value::Int64(1), Value::String("Alice".into())]);
        assert_eq!(row.get(0), Some(&Value::Int64(1)));
        assert_eq!(row.get(1), Some(&Value::String("Alice".into())));
        assert_eq!(row.get(2), None);
    }

    #[test]
    fn test_row_set_value() {
        let mut row = Row::new(1, vec![Value::Int64(1), Value::String("Alice".into())]);
        assert!(row.set(0, Value::Int64(100)));
        assert_eq!(row.get(0), Some(&Value::Int64(100)));
        assert!(!row.set(10, Value::Int64(999)));
    }

    #[test]
    fn test_row_dummy() {
        let row = Row::dummy(vec![Value::Int64(1)]);
        assert!(row.is_dummy());
        assert_eq!(row.id(), DUMMY_RECORD_ID);
    }

    #[test]
    fn test_row_equality() {
        let row1 = Row::new(1, vec![Value::Int64(42)]);
        let row2 = Row::new(1, vec![Value::Int64(42)]);
        let row3 = Row::new(2, vec![Value::Int64(42)]);
        assert_eq!(row1, row2);
        assert_ne!(row1, row3);
    }
}
