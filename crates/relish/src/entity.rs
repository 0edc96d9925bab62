//! Entity trait binding a Rust type to a stored table.

use crate::session::Session;
use alloc::vec::Vec;
use relish_core::schema::Table;
use relish_core::{RecordId, Result, Value};

/// A record type stored in its own table.
///
/// An entity knows its table layout, carries an optional identity (absent
/// until persisted), and converts to and from the table's row values.
pub trait Entity: Sized {
    /// Table name.
    const TABLE: &'static str;

    /// Number of columns in the table.
    const WIDTH: usize;

    /// Builds the table schema, including references to other tables.
    fn schema() -> Table;

    /// Returns the identity, if this entity has been persisted.
    fn id(&self) -> Option<RecordId>;

    /// Assigns the identity on persist.
    fn assign_id(&mut self, id: RecordId);

    /// Encodes this entity as a full table row.
    fn to_values(&self) -> Vec<Value>;

    /// Decodes an entity from a full table row.
    fn from_values(values: &[Value]) -> Result<Self>;

    /// Resolves this entity's associations against the session.
    ///
    /// The default does nothing; entities with associations override it to
    /// force-load their targets for eager fetching.
    fn resolve_associations(&self, session: &Session) -> Result<()> {
        let _ = session;
        Ok(())
    }
}
