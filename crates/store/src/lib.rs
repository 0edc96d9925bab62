//! Relish Store - Record storage layer for the Relish query engine.
//!
//! This crate provides the in-memory storage layer:
//!
//! - `RecordStore`: Per-table record storage with identity allocation and a
//!   staged write buffer
//! - `Catalog`: Multi-table store management
//!
//! # Example
//!
//! ```rust
//! use relish_store::Catalog;
//! use relish_core::schema::TableBuilder;
//! use relish_core::{DataType, Row, Value};
//!
//! let mut catalog = Catalog::new();
//! let schema = TableBuilder::new("team")
//!     .unwrap()
//!     .add_column("id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .build();
//! catalog.create_table(schema).unwrap();
//!
//! let store = catalog.get_table_mut("team").unwrap();
//! let id = store.allocate_id();
//! store.stage(Row::new(id, vec![Value::Int64(id as i64), Value::String("teamA".into())])).unwrap();
//! store.flush().unwrap();
//!
//! assert_eq!(catalog.get_table("team").unwrap().len(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod catalog;
pub mod record_store;

pub use catalog::Catalog;
pub use record_store::RecordStore;
