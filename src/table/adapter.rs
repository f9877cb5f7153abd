//! Bidirectional grid ↔ row-object transforms
//!
//! The two transforms are exact inverses on well-formed input: for any
//! `rows` conforming to `schema`,
//! `grid_to_rows(&rows_to_grid(&rows, schema), schema, &mut RowKeys::new())`
//! yields `rows` again (fresh allocators on both sides).

use tracing::debug;

use crate::schema::VariableSchema;
use crate::table::{is_blank_row, RawGrid, RowKeys, TableRow};

/// Convert a raw grid into row objects.
///
/// Drops the header row, then zips each data row against schema column
/// order. Two upload-parsing artifacts are discarded rather than treated as
/// data: a row that is a single empty-string cell (the trailing artifact
/// CSV parsers emit) and any fully blank row. Missing trailing cells read
/// as empty strings.
pub fn grid_to_rows(grid: &RawGrid, schema: &VariableSchema, keys: &mut RowKeys) -> Vec<TableRow> {
    let mut rows = Vec::new();
    for raw in grid.iter().skip(1) {
        if is_blank_row(raw) {
            debug!(cells = raw.len(), "discarding blank upload row");
            continue;
        }
        let mut row = TableRow::empty(keys.mint());
        for (index, column) in schema.columns().iter().enumerate() {
            let cell = raw.get(index).cloned().unwrap_or_default();
            row.values.insert(column.name.clone(), cell);
        }
        rows.push(row);
    }
    rows
}

/// Convert row objects back into the raw grid shape the validator expects.
///
/// The header is rebuilt from schema titles; each row emits its values in
/// schema name order, with unset names reading as empty strings.
pub fn rows_to_grid(rows: &[TableRow], schema: &VariableSchema) -> RawGrid {
    let header: Vec<String> = schema.titles().map(str::to_string).collect();
    let mut grid = Vec::with_capacity(rows.len() + 1);
    grid.push(header);
    for row in rows {
        grid.push(
            schema
                .columns()
                .iter()
                .map(|column| row.value(&column.name).to_string())
                .collect(),
        );
    }
    grid
}
