//! Relish Query - Query evaluation engine for the Relish in-memory store.
//!
//! This crate provides the untyped half of the query pipeline:
//!
//! - `ast`: Expression AST, sort keys, and join types
//! - `plan`: Immutable query plan trees
//! - `executor`: Execution operators (join, aggregate, sort, limit) and the
//!   `PlanRunner` that drives a plan against a `DataSource`
//!
//! Typed query building on top of this engine lives in the `relish` crate.

#![no_std]

extern crate alloc;

pub mod ast;
pub mod executor;
pub mod plan;

pub use ast::{
    AggregateFunc, BinaryOp, ColumnRef, Expr, JoinType, NullOrder, SortKey, SortOrder, UnaryOp,
};
pub use executor::{DataSource, EvalContext, PlanRunner, Relation, RelationEntry};
pub use plan::Plan;
