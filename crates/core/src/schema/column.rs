//! Column definition for the Relish schema.

use crate::types::DataType;
use alloc::string::String;

/// A column definition in a table schema.
#[derive(Clone, Debug)]
pub struct Column {
    /// Column name.
    name: String,
    /// Data type of the column.
    data_type: DataType,
    /// Whether this column allows null values.
    nullable: bool,
    /// Column index in the table (0-based).
    index: usize,
}

impl Column {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            index: 0,
        }
    }

    /// Sets whether this column is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the column index.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the data type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns whether this column is nullable.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the column index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}
