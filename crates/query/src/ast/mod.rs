//! Expression AST for query plans.

mod expr;

pub use expr::{
    AggregateFunc, BinaryOp, ColumnRef, Expr, JoinType, NullOrder, SortKey, SortOrder, UnaryOp,
};
