//! Plan runner. Executes a query plan against a data source.
//!
//! The runner recursively evaluates plan nodes and combines results using
//! the execution operators. Column references are table-relative; the
//! runner resolves them to absolute offsets in the combined row using the
//! relation's table layout.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::executor::{
    AggregateExecutor, LimitExecutor, NestedLoopJoin, OutputColumn, Relation, RelationEntry,
    SortExecutor,
};
use crate::plan::Plan;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use relish_core::{Error, Result, Row, Value};

/// Context for expression evaluation.
///
/// Carries the table layout of the relation being evaluated so that
/// table-relative column indices can be turned into absolute offsets.
#[derive(Clone, Debug)]
pub struct EvalContext<'a> {
    /// Table names in the relation, in layout order.
    pub tables: &'a [String],
    /// Column counts for each table.
    pub table_column_counts: &'a [usize],
}

impl<'a> EvalContext<'a> {
    /// Creates a new evaluation context.
    #[inline]
    pub fn new(tables: &'a [String], table_column_counts: &'a [usize]) -> Self {
        Self {
            tables,
            table_column_counts,
        }
    }

    /// Computes the absolute column index in the combined row from a table
    /// name and a table-relative index.
    #[inline]
    pub fn resolve_column_index(&self, table_name: &str, table_relative_index: usize) -> usize {
        let mut offset = 0;
        for (i, t) in self.tables.iter().enumerate() {
            if t == table_name {
                return offset + table_relative_index;
            }
            offset += self.table_column_counts.get(i).copied().unwrap_or(0);
        }
        // Table not present: the relation has already been reshaped (after
        // aggregation or projection) and the index is absolute.
        table_relative_index
    }
}

/// Data source trait providing table rows to the runner.
pub trait DataSource {
    /// Returns all rows of a table.
    fn table_rows(&self, table: &str) -> Result<Vec<Rc<Row>>>;

    /// Returns the column count of a table.
    fn table_width(&self, table: &str) -> Result<usize>;
}

/// Plan runner. Executes query plans against a data source.
pub struct PlanRunner<'a, D: DataSource> {
    data_source: &'a D,
}

impl<'a, D: DataSource> PlanRunner<'a, D> {
    /// Creates a new plan runner with the given data source.
    pub fn new(data_source: &'a D) -> Self {
        Self { data_source }
    }

    /// Executes a plan and returns the result relation.
    pub fn execute(&self, plan: &Plan) -> Result<Relation> {
        match plan {
            Plan::Scan { table } => {
                let rows = self.data_source.table_rows(table)?;
                let width = self.data_source.table_width(table)?;
                Ok(Relation::from_rows(rows, table.clone(), width))
            }

            Plan::Join {
                left,
                right,
                condition,
                join_type,
            } => {
                let left_rel = self.execute(left)?;
                let right_rel = self.execute(right)?;

                let mut tables = left_rel.tables.clone();
                tables.extend(right_rel.tables.iter().cloned());
                let mut counts = left_rel.table_column_counts.clone();
                counts.extend(right_rel.table_column_counts.iter().cloned());
                let ctx = EvalContext::new(&tables, &counts);

                let join = NestedLoopJoin::new(*join_type);
                Ok(match condition {
                    Some(expr) => join.execute(left_rel, right_rel, |entry| {
                        eval_predicate(expr, entry, &ctx)
                    }),
                    None => join.execute(left_rel, right_rel, |_| true),
                })
            }

            Plan::Filter { input, predicate } => {
                let input_rel = self.execute(input)?;
                let tables = input_rel.tables.clone();
                let counts = input_rel.table_column_counts.clone();
                let ctx = EvalContext::new(&tables, &counts);

                let entries: Vec<RelationEntry> = input_rel
                    .into_iter()
                    .filter(|entry| eval_predicate(predicate, entry, &ctx))
                    .collect();

                Ok(Relation {
                    entries,
                    tables,
                    table_column_counts: counts,
                })
            }

            Plan::Aggregate {
                input,
                group_by,
                output,
            } => {
                let input_rel = self.execute(input)?;
                let ctx =
                    EvalContext::new(&input_rel.tables, &input_rel.table_column_counts);

                let group_indices = group_by
                    .iter()
                    .map(|expr| resolve_column(expr, &ctx))
                    .collect::<Result<Vec<usize>>>()?;

                let output_columns = output
                    .iter()
                    .map(|expr| match expr {
                        Expr::Column(_) => Ok(OutputColumn::Group(resolve_column(expr, &ctx)?)),
                        Expr::Aggregate { func, expr } => {
                            let idx = match expr {
                                Some(inner) => Some(resolve_column(inner, &ctx)?),
                                None => None,
                            };
                            Ok(OutputColumn::Aggregate(*func, idx))
                        }
                        _ => Err(Error::invalid_operation(
                            "aggregate output must be a group column or an aggregate",
                        )),
                    })
                    .collect::<Result<Vec<OutputColumn>>>()?;

                let executor = AggregateExecutor::new(group_indices, output_columns);
                Ok(executor.execute(input_rel))
            }

            Plan::Sort { input, keys } => {
                let input_rel = self.execute(input)?;
                let ctx =
                    EvalContext::new(&input_rel.tables, &input_rel.table_column_counts);

                let resolved = keys
                    .iter()
                    .map(|key| Ok((resolve_column(&key.expr, &ctx)?, key.order, key.nulls)))
                    .collect::<Result<Vec<_>>>()?;

                let executor = SortExecutor::new(resolved);
                Ok(executor.execute(input_rel))
            }

            Plan::Limit {
                input,
                limit,
                offset,
            } => {
                let input_rel = self.execute(input)?;
                let executor = LimitExecutor::new(*limit, *offset);
                Ok(executor.execute(input_rel))
            }

            Plan::Project { input, columns } => {
                let input_rel = self.execute(input)?;
                let tables = input_rel.tables.clone();
                let counts = input_rel.table_column_counts.clone();
                let ctx = EvalContext::new(&tables, &counts);

                let entries: Vec<RelationEntry> = input_rel
                    .iter()
                    .map(|entry| {
                        let values: Vec<Value> = columns
                            .iter()
                            .map(|col| eval_expr(col, entry, &ctx))
                            .collect();
                        RelationEntry::new(Rc::new(Row::new(entry.id(), values)))
                    })
                    .collect();

                Ok(Relation {
                    entries,
                    tables,
                    table_column_counts: alloc::vec![columns.len()],
                })
            }
        }
    }
}

fn resolve_column(expr: &Expr, ctx: &EvalContext<'_>) -> Result<usize> {
    match expr {
        Expr::Column(col) => Ok(ctx.resolve_column_index(&col.table, col.index)),
        _ => Err(Error::invalid_operation(
            "expected a column reference",
        )),
    }
}

/// Evaluates an expression against a relation entry.
pub fn eval_expr(expr: &Expr, entry: &RelationEntry, ctx: &EvalContext<'_>) -> Value {
    match expr {
        Expr::Column(col) => {
            let index = ctx.resolve_column_index(&col.table, col.index);
            entry.get_field(index).cloned().unwrap_or(Value::Null)
        }

        Expr::Literal(value) => value.clone(),

        Expr::BinaryOp { left, op, right } => {
            let left_val = eval_expr(left, entry, ctx);
            let right_val = eval_expr(right, entry, ctx);
            eval_binary_op(*op, &left_val, &right_val)
        }

        Expr::UnaryOp { op, expr } => {
            let val = eval_expr(expr, entry, ctx);
            eval_unary_op(*op, &val)
        }

        // A bare aggregate evaluated per row degrades to the row's value.
        Expr::Aggregate { expr, .. } => match expr {
            Some(e) => eval_expr(e, entry, ctx),
            None => Value::Int64(1),
        },

        Expr::Between { expr, low, high } => {
            let val = eval_expr(expr, entry, ctx);
            let low_val = eval_expr(low, entry, ctx);
            let high_val = eval_expr(high, entry, ctx);
            if val.is_null() || low_val.is_null() || high_val.is_null() {
                return Value::Null;
            }
            Value::Boolean(val >= low_val && val <= high_val)
        }

        Expr::In { expr, list } => {
            let val = eval_expr(expr, entry, ctx);
            if val.is_null() {
                return Value::Null;
            }
            let found = list.iter().any(|item| eval_expr(item, entry, ctx) == val);
            Value::Boolean(found)
        }
    }
}

/// Evaluates a predicate expression against a relation entry. Null and
/// non-boolean results count as no match.
pub fn eval_predicate(expr: &Expr, entry: &RelationEntry, ctx: &EvalContext<'_>) -> bool {
    matches!(eval_expr(expr, entry, ctx), Value::Boolean(true))
}

fn eval_binary_op(op: BinaryOp, left: &Value, right: &Value) -> Value {
    // Null propagation, with three-valued AND/OR.
    if left.is_null() || right.is_null() {
        return match op {
            BinaryOp::And => {
                if matches!(left, Value::Boolean(false)) || matches!(right, Value::Boolean(false)) {
                    Value::Boolean(false)
                } else {
                    Value::Null
                }
            }
            BinaryOp::Or => {
                if matches!(left, Value::Boolean(true)) || matches!(right, Value::Boolean(true)) {
                    Value::Boolean(true)
                } else {
                    Value::Null
                }
            }
            _ => Value::Null,
        };
    }

    match op {
        BinaryOp::Eq => Value::Boolean(left == right),
        BinaryOp::Ne => Value::Boolean(left != right),
        BinaryOp::Lt => Value::Boolean(left < right),
        BinaryOp::Le => Value::Boolean(left <= right),
        BinaryOp::Gt => Value::Boolean(left > right),
        BinaryOp::Ge => Value::Boolean(left >= right),
        BinaryOp::And => Value::Boolean(
            matches!(left, Value::Boolean(true)) && matches!(right, Value::Boolean(true)),
        ),
        BinaryOp::Or => Value::Boolean(
            matches!(left, Value::Boolean(true)) || matches!(right, Value::Boolean(true)),
        ),
    }
}

fn eval_unary_op(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Not => match value {
            Value::Boolean(b) => Value::Boolean(!b),
            _ => Value::Null,
        },
        UnaryOp::IsNull => Value::Boolean(value.is_null()),
        UnaryOp::IsNotNull => Value::Boolean(!value.is_null()),
    }
}
