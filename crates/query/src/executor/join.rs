//! Nested loop join executor.

use crate::ast::JoinType;
use crate::executor::{Relation, RelationEntry};
use alloc::vec::Vec;

/// Nested loop join executor.
///
/// Compares every pair of rows, testing the join condition against the
/// combined candidate row. This handles equi-joins, arbitrary ON conditions
/// and cross products uniformly; with no condition every pair matches.
pub struct NestedLoopJoin {
    join_type: JoinType,
}

impl NestedLoopJoin {
    /// Creates a new nested loop join executor.
    pub fn new(join_type: JoinType) -> Self {
        Self { join_type }
    }

    /// Executes the join. `matches` is evaluated against each combined
    /// candidate entry, laid out as left columns followed by right columns.
    pub fn execute<F>(&self, left: Relation, right: Relation, matches: F) -> Relation
    where
        F: Fn(&RelationEntry) -> bool,
    {
        let right_col_count = right.total_columns();
        let mut entries = Vec::new();

        for left_entry in left.iter() {
            let mut match_found = false;

            for right_entry in right.iter() {
                let combined = RelationEntry::combine(left_entry, right_entry);
                if matches(&combined) {
                    match_found = true;
                    entries.push(combined);
                }
            }

            // Left outer join keeps unmatched left rows padded with nulls.
            if self.join_type == JoinType::LeftOuter && !match_found {
                entries.push(RelationEntry::combine_with_null(
                    left_entry,
                    right_col_count,
                ));
            }
        }

        let mut tables = left.tables;
        tables.extend(right.tables);
        let mut table_column_counts = left.table_column_counts;
        table_column_counts.extend(right.table_column_counts);

        Relation {
            entries,
            tables,
            table_column_counts,
        }
    }
}
