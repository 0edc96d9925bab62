//! Schema module for the Relish engine.
//!
//! This module contains the schema definitions: columns, tables, and the
//! references that link a table to the tables it points at.

mod column;
mod table;

pub use column::Column;
pub use table::{Reference, Table, TableBuilder};
