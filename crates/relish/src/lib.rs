//! Typed query building over an in-memory record store.
//!
//! Records are declared as [`Entity`] types, persisted through a
//! [`Session`], and queried with a fluent, immutable [`SelectBuilder`]:
//!
//! ```
//! use relish::{member, Member, Session};
//!
//! let session = Session::open()?;
//! let mut member = Member::new("alice", 30);
//! session.persist(&mut member)?;
//!
//! let found: Member = session
//!     .select_from::<Member>()
//!     .filter(member::USERNAME.eq("alice").and(member::AGE.eq(30)))
//!     .fetch_one()?;
//! assert_eq!(found.age, Some(30));
//! # Ok::<(), relish::Error>(())
//! ```

#![no_std]

extern crate alloc;

pub mod association;
pub mod entities;
pub mod entity;
pub mod query;
pub mod result;
pub mod session;

pub use association::{Association, FetchMode};
pub use entities::{member, team, Member, Team};
pub use entity::Entity;
pub use query::{count_all, FieldRef, Predicate, SelectBuilder, Selection};
pub use relish_core::{DataType, Error, RecordId, Result, Value};
pub use result::{FromRow, QueryResults, ResultLayout, Tuple};
pub use session::Session;
