//! Error types for the Relish engine.

use crate::row::RecordId;
use alloc::string::String;
use core::fmt;

/// Result type alias for Relish operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for store and query operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Record not found by identity.
    NotFound {
        table: String,
        key: RecordId,
    },
    /// Insert with an identity that is already present.
    DuplicateInsert {
        table: String,
        key: RecordId,
    },
    /// Table not found.
    TableNotFound {
        name: String,
    },
    /// Column not found.
    ColumnNotFound {
        table: String,
        column: String,
    },
    /// A single-result fetch matched no rows.
    NoResult,
    /// A single-result fetch matched more than one row.
    NonUniqueResult {
        count: usize,
    },
    /// A required association target is absent.
    NoAssociation {
        table: String,
        key: RecordId,
    },
    /// Invalid schema definition.
    InvalidSchema {
        message: String,
    },
    /// Invalid operation.
    InvalidOperation {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { table, key } => {
                write!(f, "Not found in table {}: record {}", table, key)
            }
            Error::DuplicateInsert { table, key } => {
                write!(f, "Duplicate insert into table {}: record {}", table, key)
            }
            Error::TableNotFound { name } => {
                write!(f, "Table not found: {}", name)
            }
            Error::ColumnNotFound { table, column } => {
                write!(f, "Column {} not found in table {}", column, table)
            }
            Error::NoResult => {
                write!(f, "Query returned no result")
            }
            Error::NonUniqueResult { count } => {
                write!(f, "Query returned {} results where exactly one was expected", count)
            }
            Error::NoAssociation { table, key } => {
                write!(f, "No associated record in table {} for key {}", table, key)
            }
            Error::InvalidSchema { message } => {
                write!(f, "Invalid schema: {}", message)
            }
            Error::InvalidOperation { message } => {
                write!(f, "Invalid operation: {}", message)
            }
        }
    }
}

impl Error {
    /// Creates a not-found error.
    pub fn not_found(table: impl Into<String>, key: RecordId) -> Self {
        Error::NotFound {
            table: table.into(),
            key,
        }
    }

    /// Creates a duplicate-insert error.
    pub fn duplicate_insert(table: impl Into<String>, key: RecordId) -> Self {
        Error::DuplicateInsert {
            table: table.into(),
            key,
        }
    }

    /// Creates a table-not-found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates a column-not-found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a no-association error.
    pub fn no_association(table: impl Into<String>, key: RecordId) -> Self {
        Error::NoAssociation {
            table: table.into(),
            key,
        }
    }

    /// Creates an invalid-schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates an invalid-operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }
}
