//! Relish Core - Core types and schema definitions for the Relish query engine.
//!
//! This crate provides the foundational types shared by the store and the
//! query evaluator:
//!
//! - `DataType`: Supported data types (Boolean, Int64, Float64, String)
//! - `Value`: Runtime values that can be stored in a record field
//! - `Row`: A record's values together with its identity
//! - `schema`: Schema definitions (Column, Table, TableBuilder)
//! - `Error`: Error types for store and query operations
//!
//! # Example
//!
//! ```rust
//! use relish_core::{DataType, Value, Row};
//! use relish_core::schema::TableBuilder;
//!
//! let table = TableBuilder::new("member")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("username", DataType::String)
//!     .unwrap()
//!     .add_nullable(&["username"])
//!     .build();
//!
//! let row = Row::new(1, vec![
//!     Value::Int64(1),
//!     Value::String("member1".into()),
//! ]);
//!
//! assert_eq!(row.id(), 1);
//! assert_eq!(table.get_column_index("username"), Some(1));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod row;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use row::{RecordId, Row, DUMMY_RECORD_ID};
pub use types::DataType;
pub use value::Value;
