//! Sort executor.

use crate::ast::{NullOrder, SortOrder};
use crate::executor::{Relation, RelationEntry};
use alloc::vec::Vec;
use core::cmp::Ordering;
use relish_core::Value;

/// Sort executor. Sorts rows by resolved column indices.
///
/// Null placement is decided per key and is independent of the direction:
/// a descending key with `NullOrder::First` still puts its nulls before
/// every non-null value.
pub struct SortExecutor {
    /// Column index, direction and null placement per key.
    keys: Vec<(usize, SortOrder, NullOrder)>,
}

impl SortExecutor {
    /// Creates a new sort executor.
    pub fn new(keys: Vec<(usize, SortOrder, NullOrder)>) -> Self {
        Self { keys }
    }

    /// Executes the sort on the input relation. The sort is stable, so rows
    /// that compare equal keep their input order.
    pub fn execute(&self, mut input: Relation) -> Relation {
        input.entries.sort_by(|a, b| self.compare_entries(a, b));
        input
    }

    fn compare_entries(&self, a: &RelationEntry, b: &RelationEntry) -> Ordering {
        for (col_idx, order, nulls) in &self.keys {
            let a_val = a.get_field(*col_idx);
            let b_val = b.get_field(*col_idx);
            let a_null = a_val.map(Value::is_null).unwrap_or(true);
            let b_null = b_val.map(Value::is_null).unwrap_or(true);

            let cmp = match (a_null, b_null) {
                (true, true) => Ordering::Equal,
                (true, false) => match nulls {
                    NullOrder::First => Ordering::Less,
                    NullOrder::Last => Ordering::Greater,
                },
                (false, true) => match nulls {
                    NullOrder::First => Ordering::Greater,
                    NullOrder::Last => Ordering::Less,
                },
                (false, false) => {
                    let cmp = a_val.cmp(&b_val);
                    match order {
                        SortOrder::Asc => cmp,
                        SortOrder::Desc => cmp.reverse(),
                    }
                }
            };

            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }
}
