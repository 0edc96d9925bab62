//! Limit executor.

use crate::executor::Relation;

/// Limit executor. Applies OFFSET and an optional LIMIT to a relation.
pub struct LimitExecutor {
    limit: Option<usize>,
    offset: usize,
}

impl LimitExecutor {
    /// Creates a new limit executor.
    pub fn new(limit: Option<usize>, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Executes the limit on the input relation.
    pub fn execute(&self, mut input: Relation) -> Relation {
        let len = input.entries.len();
        let start = self.offset.min(len);
        let end = match self.limit {
            Some(limit) => (start + limit).min(len),
            None => len,
        };

        input.entries.truncate(end);
        if start > 0 {
            input.entries.drain(..start);
        }
        input
    }
}
