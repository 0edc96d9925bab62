//! Table definition for the Relish schema.

use super::column::Column;
use crate::error::{Error, Result};
use crate::types::DataType;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A reference from a column of this table to another table's identity column.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    /// Referencing column in this table.
    pub column: String,
    /// Referenced table name.
    pub table: String,
}

/// A table definition in the schema.
#[derive(Clone, Debug)]
pub struct Table {
    /// Table name.
    name: String,
    /// Column definitions.
    columns: Vec<Column>,
    /// Outgoing references to other tables.
    references: Vec<Reference>,
}

impl Table {
    /// Creates a new table with the given name and columns.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let columns: Vec<Column> = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();

        Self {
            name: name.into(),
            columns,
            references: Vec::new(),
        }
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the outgoing references.
    #[inline]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a column index by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Gets the reference going out through the given column, if any.
    pub fn get_reference(&self, column: &str) -> Option<&Reference> {
        self.references.iter().find(|r| r.column == column)
    }

    /// Adds a reference from a column to another table's identity column.
    pub fn with_reference(mut self, column: &str, parent_table: &str) -> Self {
        self.references.push(Reference {
            column: column.to_string(),
            table: parent_table.to_string(),
        });
        self
    }
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    references: Vec<Reference>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            references: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSchema {
                message: "Name cannot be empty".into(),
            });
        }
        let first = name.chars().next().unwrap();
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::InvalidSchema {
                message: format!("Name must start with letter or underscore: {}", name),
            });
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidSchema {
                message: format!("Name contains invalid characters: {}", name),
            });
        }
        Ok(())
    }

    /// Adds a column to the table.
    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::InvalidSchema {
                message: format!("Column already exists: {}", name),
            });
        }
        self.columns.push(Column::new(name, data_type));
        Ok(self)
    }

    /// Marks the named columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Self {
        for name in columns {
            if let Some(col) = self.columns.iter_mut().find(|c| c.name() == *name) {
                *col = col.clone().nullable(true);
            }
        }
        self
    }

    /// Adds a reference from a column to another table's identity column.
    pub fn add_reference(mut self, column: &str, parent_table: &str) -> Result<Self> {
        if !self.columns.iter().any(|c| c.name() == column) {
            return Err(Error::InvalidSchema {
                message: format!("Column not found: {}", column),
            });
        }
        self.references.push(Reference {
            column: column.to_string(),
            table: parent_table.to_string(),
        });
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Table {
        let mut table = Table::new(self.name, self.columns);
        table.references = self.references;
        table
    }
}
