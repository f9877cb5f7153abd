//! Type-aware cell editors
//!
//! Each schema column gets an editor chosen from its explicit [`VarType`]:
//! plain text, integer-constrained numeric input, decimal-stringed numeric
//! input, or a file picker whose value is an opaque upload handle.

use thiserror::Error;

use crate::schema::VarType;

/// Cell edit errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// No row with the given key
    #[error("no row with key {key}")]
    UnknownRow {
        /// The missing key
        key: u64,
    },

    /// Column name not present in the schema
    #[error("no column named {name}")]
    UnknownColumn {
        /// The missing name
        name: String,
    },

    /// Commit or cancel without an open edit session
    #[error("no cell is being edited")]
    NoActiveEdit,

    /// Integer editor rejected the input
    #[error("{input:?} is not an integer")]
    NotInteger {
        /// The rejected input
        input: String,
    },

    /// Decimal editor rejected the input
    #[error("{input:?} is not a decimal number")]
    NotDecimal {
        /// The rejected input
        input: String,
    },
}

/// Editor kind for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEditor {
    /// Plain text input, committed verbatim
    Text,
    /// Numeric input constrained to integers
    Integer,
    /// Numeric input validated as a decimal but kept as the typed string,
    /// so precision is never lost to a float round-trip
    Decimal,
    /// File picker; the committed value is the upload handle, passed
    /// through opaque
    FilePicker,
}

impl CellEditor {
    /// Editor for a column type.
    pub fn for_type(var_type: VarType) -> Self {
        match var_type {
            VarType::Text => Self::Text,
            VarType::Int => Self::Integer,
            VarType::Float => Self::Decimal,
            VarType::File => Self::FilePicker,
        }
    }

    /// Validate and normalize a committed input.
    ///
    /// An empty (or all-whitespace, for numeric editors) input clears the
    /// cell rather than erroring, matching clearing a form field.
    pub fn normalize(&self, input: &str) -> Result<String, EditError> {
        match self {
            Self::Text | Self::FilePicker => Ok(input.to_string()),
            Self::Integer => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Ok(String::new());
                }
                trimmed
                    .parse::<i64>()
                    .map(|n| n.to_string())
                    .map_err(|_| EditError::NotInteger {
                        input: input.to_string(),
                    })
            }
            Self::Decimal => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Ok(String::new());
                }
                if trimmed.parse::<f64>().is_err() {
                    return Err(EditError::NotDecimal {
                        input: input.to_string(),
                    });
                }
                Ok(trimmed.to_string())
            }
        }
    }
}
