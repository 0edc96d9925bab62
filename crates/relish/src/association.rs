//! Lazy association between an entity and a referenced record.

use crate::entity::Entity;
use crate::session::Session;
use core::cell::{Cell, RefCell};
use relish_core::{Error, RecordId, Result};

/// How an association target is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// The target is loaded on first access.
    #[default]
    Lazy,
    /// The target is loaded together with its owner.
    Eager,
}

/// A to-one association holding the referenced record's key and, once
/// resolved, the target itself.
///
/// Resolution state is observable: `is_resolved` reports whether the target
/// has been materialized, without triggering a load.
#[derive(Clone, Debug)]
pub struct Association<T> {
    /// Key of the referenced record, if any.
    key: Option<RecordId>,
    /// Whether the target has been materialized.
    resolved: Cell<bool>,
    /// The cached target.
    target: RefCell<Option<T>>,
}

impl<T: Entity + Clone> Association<T> {
    /// Creates an unresolved association to the given key.
    pub fn to(key: RecordId) -> Self {
        Self {
            key: Some(key),
            resolved: Cell::new(false),
            target: RefCell::new(None),
        }
    }

    /// Creates an association to nothing. It is already resolved.
    pub fn none() -> Self {
        Self {
            key: None,
            resolved: Cell::new(true),
            target: RefCell::new(None),
        }
    }

    /// Creates an association whose target is already materialized.
    pub fn resolved(target: T) -> Self {
        Self {
            key: target.id(),
            resolved: Cell::new(true),
            target: RefCell::new(Some(target)),
        }
    }

    /// Creates an association from an optional key.
    pub fn from_key(key: Option<RecordId>) -> Self {
        match key {
            Some(key) => Self::to(key),
            None => Self::none(),
        }
    }

    /// Returns the referenced key, if any.
    pub fn key(&self) -> Option<RecordId> {
        self.key
    }

    /// Returns whether the target has been materialized.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }

    /// Returns the cached target without loading.
    pub fn get(&self) -> Option<T> {
        self.target.borrow().clone()
    }

    /// Resolves the association, loading the target from the session on
    /// first access. An association to nothing resolves to `None`.
    pub fn resolve(&self, session: &Session) -> Result<Option<T>> {
        if self.resolved.get() {
            return Ok(self.get());
        }
        let key = match self.key {
            Some(key) => key,
            None => {
                self.resolved.set(true);
                return Ok(None);
            }
        };
        let target = session
            .find::<T>(key)?
            .ok_or_else(|| Error::not_found(T::TABLE, key))?;
        *self.target.borrow_mut() = Some(target.clone());
        self.resolved.set(true);
        Ok(Some(target))
    }

    /// Resolves the association, erroring if it points at nothing.
    pub fn load_required(&self, session: &Session) -> Result<T> {
        self.resolve(session)?
            .ok_or_else(|| Error::no_association(T::TABLE, self.key.unwrap_or_default()))
    }
}

impl<T: Entity + Clone> Default for Association<T> {
    fn default() -> Self {
        Self::none()
    }
}
