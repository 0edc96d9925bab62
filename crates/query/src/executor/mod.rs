//! Query executor module.

mod aggregate;
mod join;
mod limit;
mod relation;
mod runner;
mod sort;

pub use aggregate::{AggregateExecutor, OutputColumn};
pub use join::NestedLoopJoin;
pub use limit::LimitExecutor;
pub use relation::{Relation, RelationEntry};
pub use runner::{eval_expr, eval_predicate, DataSource, EvalContext, PlanRunner};
pub use sort::SortExecutor;
