//! Variable schema for batch tables
//!
//! The schema is supplied by the external flow editor and is read-only for
//! the duration of a run. It fixes column order, display titles, required
//! flags, and the editor type for each column.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schema construction errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Two columns share the same variable name
    #[error("Duplicate variable name: {name}")]
    DuplicateName {
        /// The offending name
        name: String,
    },

    /// A schema must have at least one column
    #[error("Schema has no columns")]
    Empty,
}

/// Value type of a schema column, driving the cell editor and the
/// invocation parameter shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    /// Free text
    #[default]
    Text,
    /// Integer-constrained numeric value
    Int,
    /// Decimal numeric value, kept as a decimal string
    Float,
    /// Uploaded file, carried as an opaque upload handle
    File,
}

/// One column of the batch table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Unique variable name, the key rows are stored under
    pub name: String,
    /// Display label used as the grid/template header
    pub title: String,
    /// Whether a non-blank value is required in every row
    pub required: bool,
    /// Column value type
    #[serde(rename = "type", default)]
    pub var_type: VarType,
}

impl Variable {
    /// Create a column definition.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        required: bool,
        var_type: VarType,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            required,
            var_type,
        }
    }

    /// Create a column from a legacy `title:type` label.
    ///
    /// Upstream flow definitions encode the editor type as a suffix on the
    /// display label (`"Age:int"`, `"Avatar:file"`). The suffix is stripped
    /// into the explicit [`VarType`] field; an unknown or missing suffix
    /// means plain text and the label is kept verbatim.
    pub fn from_labeled_title(
        name: impl Into<String>,
        labeled_title: &str,
        required: bool,
    ) -> Self {
        let (title, var_type) = match labeled_title.split_once(':') {
            Some((head, "int")) => (head, VarType::Int),
            Some((head, "float")) => (head, VarType::Float),
            Some((head, "file")) => (head, VarType::File),
            _ => (labeled_title, VarType::Text),
        };
        Self::new(name, title, required, var_type)
    }
}

/// Ordered, immutable set of columns a batch table must conform to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSchema {
    columns: Vec<Variable>,
}

impl VariableSchema {
    /// Build a schema, rejecting duplicate names and empty column sets.
    pub fn new(columns: Vec<Variable>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(SchemaError::DuplicateName {
                    name: col.name.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Columns in schema order.
    pub fn columns(&self) -> &[Variable] {
        &self.columns
    }

    /// Display titles in schema order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.title.as_str())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the schema has no columns (unreachable via [`Self::new`]).
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by variable name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column lookup by variable name.
    pub fn column(&self, name: &str) -> Option<&Variable> {
        self.columns.iter().find(|c| c.name == name)
    }
}
