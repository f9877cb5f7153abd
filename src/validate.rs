//! Pre-run input validation
//!
//! Validates a raw grid against the variable schema before any task is
//! created. Exactly one violation is reported per call, first hit wins, in
//! a fixed priority order: empty upload, header mismatch, no data rows,
//! interior blank row, no rows left after stripping trailing blanks, then
//! missing required values scanned row-major.

use thiserror::Error;
use tracing::debug;

use crate::schema::VariableSchema;
use crate::table::{is_blank_row, RawGrid};

/// Validation errors; `Display` strings are the user-facing messages.
///
/// Line numbers are 1-based and counted within the data rows only (the
/// header is line 0 territory and never reported).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// The grid has no rows at all
    #[error("upload content must not be empty")]
    EmptyUpload,

    /// The header row does not match the schema titles position-by-position
    #[error("uploaded content does not match the expected structure")]
    HeaderMismatch,

    /// No data rows remain (before or after stripping trailing blanks)
    #[error("content must contain at least one row")]
    NoDataRows,

    /// A fully blank row exists that is not part of a trailing blank run
    #[error("line {line} content is empty")]
    BlankLine {
        /// 1-based data line of the first interior blank row
        line: usize,
    },

    /// A required column has a blank (after trimming) value
    #[error("line {line}: {column} value is required")]
    MissingRequired {
        /// 1-based data line of the first violation
        line: usize,
        /// Variable name of the violating column
        column: String,
    },
}

/// Validate a raw grid against the schema.
///
/// On success returns the retained data rows: the header removed and any
/// trailing blank rows stripped. These are exactly the rows a run would
/// create tasks for.
pub fn check_batch_inputs(
    grid: &RawGrid,
    schema: &VariableSchema,
) -> Result<Vec<Vec<String>>, ValidateError> {
    let result = run_checks(grid, schema);
    if let Err(error) = &result {
        debug!(%error, rows = grid.len(), "batch input rejected");
    }
    result
}

fn run_checks(
    grid: &RawGrid,
    schema: &VariableSchema,
) -> Result<Vec<Vec<String>>, ValidateError> {
    if grid.is_empty() {
        return Err(ValidateError::EmptyUpload);
    }

    let header = &grid[0];
    let matches = schema
        .titles()
        .enumerate()
        .all(|(index, title)| header.get(index).map(String::as_str) == Some(title));
    if !matches {
        return Err(ValidateError::HeaderMismatch);
    }

    let data_rows = &grid[1..];
    if data_rows.is_empty() {
        return Err(ValidateError::NoDataRows);
    }

    // Trailing blank rows are an upload artifact and tolerated; a blank row
    // anywhere before non-blank content is a content error.
    let tail_start = data_rows
        .iter()
        .rposition(|row| !is_blank_row(row))
        .map(|last| last + 1)
        .unwrap_or(0);
    if let Some(blank) = data_rows[..tail_start].iter().position(|row| is_blank_row(row)) {
        return Err(ValidateError::BlankLine { line: blank + 1 });
    }

    let retained = &data_rows[..tail_start];
    if retained.is_empty() {
        return Err(ValidateError::NoDataRows);
    }

    for (row_index, row) in retained.iter().enumerate() {
        for (col_index, column) in schema.columns().iter().enumerate() {
            if !column.required {
                continue;
            }
            let cell = row.get(col_index).map(String::as_str).unwrap_or("");
            if cell.trim().is_empty() {
                return Err(ValidateError::MissingRequired {
                    line: row_index + 1,
                    column: column.name.clone(),
                });
            }
        }
    }

    Ok(retained.to_vec())
}
