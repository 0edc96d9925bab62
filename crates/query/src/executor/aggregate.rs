//! Aggregate executor.

use crate::ast::AggregateFunc;
use crate::executor::{Relation, RelationEntry};
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use relish_core::{Row, Value};

/// One column of the aggregate output.
#[derive(Clone, Copy, Debug)]
pub enum OutputColumn {
    /// A grouping column, identified by its absolute input index. The value
    /// is taken from the group's first row.
    Group(usize),
    /// An aggregate over the group's rows. `None` is COUNT(*).
    Aggregate(AggregateFunc, Option<usize>),
}

/// Aggregate executor. Computes grouped or whole-input aggregates.
///
/// Groups are emitted in first-seen order: the order in which the first row
/// of each group appeared in the input.
pub struct AggregateExecutor {
    /// Absolute input indices of the grouping columns.
    group_by: Vec<usize>,
    /// Output columns, in projection order.
    output: Vec<OutputColumn>,
}

impl AggregateExecutor {
    /// Creates a new aggregate executor.
    pub fn new(group_by: Vec<usize>, output: Vec<OutputColumn>) -> Self {
        Self { group_by, output }
    }

    /// Executes the aggregation on the input relation.
    pub fn execute(&self, input: Relation) -> Relation {
        let tables = input.tables.clone();
        let output_len = self.output.len();

        let groups: Vec<Vec<&RelationEntry>> = if self.group_by.is_empty() {
            // The whole input forms a single group, even when empty.
            alloc::vec![input.iter().collect()]
        } else {
            let mut index: HashMap<Vec<Value>, usize> = HashMap::new();
            let mut groups: Vec<Vec<&RelationEntry>> = Vec::new();
            for entry in input.iter() {
                let key: Vec<Value> = self
                    .group_by
                    .iter()
                    .map(|&idx| entry.get_field(idx).cloned().unwrap_or(Value::Null))
                    .collect();
                let slot = *index.entry(key).or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
                groups[slot].push(entry);
            }
            groups
        };

        let entries: Vec<RelationEntry> = groups
            .into_iter()
            .map(|group| {
                let values: Vec<Value> = self
                    .output
                    .iter()
                    .map(|col| match col {
                        OutputColumn::Group(idx) => group
                            .first()
                            .and_then(|e| e.get_field(*idx))
                            .cloned()
                            .unwrap_or(Value::Null),
                        OutputColumn::Aggregate(func, idx) => {
                            compute_aggregate(*func, *idx, &group)
                        }
                    })
                    .collect();
                RelationEntry::new(Rc::new(Row::dummy(values)))
            })
            .collect();

        Relation {
            entries,
            tables,
            table_column_counts: alloc::vec![output_len],
        }
    }
}

fn compute_aggregate(
    func: AggregateFunc,
    col_idx: Option<usize>,
    entries: &[&RelationEntry],
) -> Value {
    match func {
        AggregateFunc::Count => {
            if let Some(idx) = col_idx {
                // COUNT(column) counts non-null values.
                let count = entries
                    .iter()
                    .filter(|e| e.get_field(idx).map(|v| !v.is_null()).unwrap_or(false))
                    .count();
                Value::Int64(count as i64)
            } else {
                Value::Int64(entries.len() as i64)
            }
        }
        AggregateFunc::Sum => {
            let values = numeric_values(col_idx, entries);
            if values.is_empty() {
                return Value::Int64(0);
            }
            if values.iter().all(|v| matches!(v, Value::Int64(_))) {
                let sum: i64 = values.iter().filter_map(Value::as_i64).sum();
                Value::Int64(sum)
            } else {
                let sum: f64 = values.iter().filter_map(Value::as_numeric).sum();
                Value::Float64(sum)
            }
        }
        AggregateFunc::Avg => {
            let values = numeric_values(col_idx, entries);
            if values.is_empty() {
                return Value::Null;
            }
            if values.iter().all(|v| matches!(v, Value::Int64(_))) {
                let sum: i64 = values.iter().filter_map(Value::as_i64).sum();
                let count = values.len() as i64;
                // An exact integer average stays an integer.
                if sum % count == 0 {
                    return Value::Int64(sum / count);
                }
                return Value::Float64(sum as f64 / count as f64);
            }
            let sum: f64 = values.iter().filter_map(Value::as_numeric).sum();
            Value::Float64(sum / values.len() as f64)
        }
        AggregateFunc::Min => entries
            .iter()
            .filter_map(|e| e.get_field(col_idx.unwrap_or(0)))
            .filter(|v| !v.is_null())
            .min()
            .cloned()
            .unwrap_or(Value::Null),
        AggregateFunc::Max => entries
            .iter()
            .filter_map(|e| e.get_field(col_idx.unwrap_or(0)))
            .filter(|v| !v.is_null())
            .max()
            .cloned()
            .unwrap_or(Value::Null),
    }
}

fn numeric_values(col_idx: Option<usize>, entries: &[&RelationEntry]) -> Vec<Value> {
    let idx = col_idx.unwrap_or(0);
    entries
        .iter()
        .filter_map(|e| e.get_field(idx))
        .filter(|v| !v.is_null())
        .cloned()
        .collect()
}
