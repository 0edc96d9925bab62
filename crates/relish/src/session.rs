//! Session: the entry point for persisting and querying records.

use crate::association::FetchMode;
use crate::entity::Entity;
use crate::query::{find_by_id, SelectBuilder, Selection};
use crate::result::{FromRow, Tuple};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use relish_core::{RecordId, Result, Row};
use relish_store::Catalog;

/// A unit of work over the record store.
///
/// Persisted records are staged in a write buffer until [`flush`](Self::flush)
/// commits them; queries flush automatically before running, so a persisted
/// record is always visible to a later query in the same session.
///
/// Sessions are cheap to clone; clones share the same underlying catalog.
#[derive(Clone)]
pub struct Session {
    catalog: Rc<RefCell<Catalog>>,
}

impl Session {
    /// Creates a session over an empty catalog with no tables.
    pub fn new() -> Self {
        Self {
            catalog: Rc::new(RefCell::new(Catalog::new())),
        }
    }

    /// Creates a session with the built-in entity tables registered.
    pub fn open() -> Result<Self> {
        let session = Self::new();
        session.register::<crate::entities::Team>()?;
        session.register::<crate::entities::Member>()?;
        Ok(session)
    }

    /// Registers an entity's table.
    pub fn register<E: Entity>(&self) -> Result<()> {
        self.catalog.borrow_mut().create_table(E::schema())
    }

    /// Stages an entity for insertion. A record with no identity is
    /// assigned one; the assignment is written back to the entity.
    ///
    /// The record becomes queryable on the next flush. Persisting an
    /// identity that is already stored or staged fails with
    /// `DuplicateInsert` and stages nothing.
    pub fn persist<E: Entity>(&self, entity: &mut E) -> Result<()> {
        let mut catalog = self.catalog.borrow_mut();
        let store = catalog.require_table_mut(E::TABLE)?;
        let id = match entity.id() {
            Some(id) => id,
            None => {
                let id = store.allocate_id();
                entity.assign_id(id);
                id
            }
        };
        store.stage(Row::new(id, entity.to_values()))
    }

    /// Commits all staged records.
    pub fn flush(&self) -> Result<()> {
        self.catalog.borrow_mut().flush_all()
    }

    /// Discards all staged records without committing them.
    pub fn clear(&self) {
        self.catalog.borrow_mut().discard_staged();
    }

    /// Number of records staged and not yet flushed.
    pub fn staged_count(&self) -> usize {
        self.catalog.borrow().staged_count()
    }

    /// Removes every record, staged and committed. Tables stay registered.
    pub fn reset(&self) {
        self.catalog.borrow_mut().clear();
    }

    /// Loads one record by identity. Associations stay lazy.
    pub fn find<E: Entity>(&self, id: RecordId) -> Result<Option<E>> {
        self.flush()?;
        find_by_id::<E>(&self.catalog.borrow(), id)
    }

    /// Loads one record by identity, resolving its associations up front
    /// when `mode` is [`FetchMode::Eager`].
    pub fn find_with<E: Entity>(&self, id: RecordId, mode: FetchMode) -> Result<Option<E>> {
        let entity = self.find::<E>(id)?;
        if let (FetchMode::Eager, Some(entity)) = (mode, &entity) {
            entity.resolve_associations(self)?;
        }
        Ok(entity)
    }

    /// Starts a query returning whole records of `E`.
    pub fn select_from<E: Entity + FromRow>(&self) -> SelectBuilder<E> {
        SelectBuilder::for_record(self.clone(), E::TABLE)
    }

    /// Starts a tuple query over the given selections. Add sources with
    /// [`SelectBuilder::from`].
    pub fn select(&self, selections: Vec<Selection>) -> SelectBuilder<Tuple> {
        SelectBuilder::for_selections(self.clone(), selections)
    }

    pub(crate) fn catalog(&self) -> Rc<RefCell<Catalog>> {
        Rc::clone(&self.catalog)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Member, Team};

    #[test]
    fn persist_assigns_an_id() {
        let session = Session::open().unwrap();
        let mut member = Member::new("alice", 30);
        session.persist(&mut member).unwrap();
        assert!(member.id().is_some());
    }

    #[test]
    fn persisted_record_is_found_after_flush() {
        let session = Session::open().unwrap();
        let mut team = Team::new("teamA");
        session.persist(&mut team).unwrap();
        session.flush().unwrap();

        let found: Team = session.find(team.id().unwrap()).unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("teamA"));
    }

    #[test]
    fn find_flushes_staged_records() {
        let session = Session::open().unwrap();
        let mut member = Member::new("bob", 20);
        session.persist(&mut member).unwrap();

        let found: Option<Member> = session.find(member.id().unwrap()).unwrap();
        assert!(found.is_some());
        assert_eq!(session.staged_count(), 0);
    }

    #[test]
    fn clear_discards_staged_records() {
        let session = Session::open().unwrap();
        let mut member = Member::new("carol", 25);
        session.persist(&mut member).unwrap();
        session.clear();

        let found: Option<Member> = session.find(member.id().unwrap()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn eager_find_resolves_the_association() {
        let session = Session::open().unwrap();
        let mut team = Team::new("teamA");
        session.persist(&mut team).unwrap();
        let mut member = Member::new("alice", 30).in_team(&team);
        session.persist(&mut member).unwrap();

        let lazy: Member = session.find(member.id().unwrap()).unwrap().unwrap();
        assert!(!lazy.team.is_resolved());

        let eager: Member = session
            .find_with(member.id().unwrap(), FetchMode::Eager)
            .unwrap()
            .unwrap();
        assert!(eager.team.is_resolved());
        assert_eq!(eager.team.get().unwrap().name.as_deref(), Some("teamA"));
    }

    #[test]
    fn clones_share_the_catalog() {
        let session = Session::open().unwrap();
        let other = session.clone();
        let mut team = Team::new("shared");
        session.persist(&mut team).unwrap();
        session.flush().unwrap();

        let found: Option<Team> = other.find(team.id().unwrap()).unwrap();
        assert!(found.is_some());
    }
}
