//! Table shapes and transforms
//!
//! Three shapes flow through the engine: the raw rectangular text grid
//! ([`RawGrid`], header plus data rows) used for upload, template, and
//! validation; row objects keyed by variable name ([`TableRow`]) used for
//! editing and scheduling; and the display grid the adapter rebuilds from
//! row objects to re-validate manual edits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

mod adapter;

pub use adapter::{grid_to_rows, rows_to_grid};

/// Header-plus-rows rectangular text representation.
///
/// Row 0 is the header and must equal the schema titles in order; rows ≥ 1
/// are data.
pub type RawGrid = Vec<Vec<String>>;

/// Stable identity of a table row.
///
/// Keys are minted by [`RowKeys`] and are never reused, so a row keeps its
/// identity across deletions of other rows. Task ids are row keys, which is
/// what lets results be patched by id while the table is still being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(
    /// Raw key value
    pub u64,
);

impl std::fmt::Display for RowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for [`RowKey`]s.
#[derive(Debug, Default, Clone)]
pub struct RowKeys {
    next: u64,
}

impl RowKeys {
    /// Create an allocator starting at key 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next key. Keys are never reused.
    pub fn mint(&mut self) -> RowKey {
        let key = RowKey(self.next);
        self.next += 1;
        key
    }
}

/// One data row: variable name → string value, plus its stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Stable row identity
    pub key: RowKey,
    /// Cell values keyed by variable name
    pub values: HashMap<String, String>,
}

impl TableRow {
    /// Create a row with the given key and no values.
    pub fn empty(key: RowKey) -> Self {
        Self {
            key,
            values: HashMap::new(),
        }
    }

    /// Cell value for a variable, empty string when unset.
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// Set a cell value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

/// True when every cell of a raw row is the empty string.
pub(crate) fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}
