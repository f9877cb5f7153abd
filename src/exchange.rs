//! Template and upload interchange
//!
//! The delimited-file encode/decode itself is an external collaborator;
//! this module owns the grid shapes on either side of it: the downloadable
//! template and the cleanup applied to freshly parsed uploads.

use crate::schema::VariableSchema;
use crate::table::RawGrid;

/// Grid for the downloadable template: the schema titles as the header,
/// followed by one empty data row.
pub fn template_grid(schema: &VariableSchema) -> RawGrid {
    vec![
        schema.titles().map(str::to_string).collect(),
        vec![String::new(); schema.len()],
    ]
}

/// Clean up a freshly parsed upload before validation.
///
/// Parsers emit a trailing row consisting of a single empty-string cell for
/// files ending in a newline; those artifact rows are discarded wherever
/// they appear. Everything else, including fully blank multi-cell rows, is
/// kept for the validator to judge.
pub fn ingest_upload(parsed: RawGrid) -> RawGrid {
    parsed
        .into_iter()
        .filter(|row| !(row.len() == 1 && row[0].is_empty()))
        .collect()
}
