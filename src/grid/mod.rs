//! Headless editable-grid model
//!
//! Presents the row set as an editable surface without owning any widgets:
//! the frontend drives edit sessions (click → [`EditableGrid::begin_edit`],
//! blur or Enter → [`EditableGrid::commit`]) and receives a full row
//! snapshot through the save listener after every mutation, no diffing.
//!
//! An open session is the headless analogue of a focused cell editor.

use tracing::debug;

use crate::schema::VariableSchema;
use crate::table::{grid_to_rows, rows_to_grid, RawGrid, RowKey, RowKeys, TableRow};

mod editor;

pub use editor::{CellEditor, EditError};

/// Listener invoked with the full current row set after every mutation.
pub type SaveListener = Box<dyn Fn(&[TableRow]) + Send + Sync>;

/// An open cell edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Row being edited
    pub row: RowKey,
    /// Column (variable name) being edited
    pub column: String,
    /// Editor the frontend should render for this cell
    pub editor: CellEditor,
}

/// Editable table of rows conforming to one schema.
pub struct EditableGrid {
    schema: VariableSchema,
    rows: Vec<TableRow>,
    keys: RowKeys,
    session: Option<EditSession>,
    on_save: Option<SaveListener>,
}

impl EditableGrid {
    /// Create an empty grid for a schema.
    pub fn new(schema: VariableSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            keys: RowKeys::new(),
            session: None,
            on_save: None,
        }
    }

    /// Register the save listener. Replaces any previous listener.
    pub fn set_save_listener(&mut self, listener: SaveListener) {
        self.on_save = Some(listener);
    }

    /// Replace the grid contents from an uploaded raw grid.
    ///
    /// Rows receive fresh keys; any open edit session is dropped.
    pub fn load_upload(&mut self, grid: &RawGrid) {
        self.session = None;
        self.rows = grid_to_rows(grid, &self.schema, &mut self.keys);
        debug!(rows = self.rows.len(), "grid loaded from upload");
        self.notify();
    }

    /// Current rows in display order.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// One row by key.
    pub fn row(&self, key: RowKey) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// The schema this grid conforms to.
    pub fn schema(&self) -> &VariableSchema {
        &self.schema
    }

    /// Rebuild the raw grid shape for re-validation after manual edits.
    pub fn to_grid(&self) -> RawGrid {
        rows_to_grid(&self.rows, &self.schema)
    }

    /// The open edit session, if any.
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Open an edit session on a cell.
    ///
    /// Returns the session carrying the editor for the column's type.
    /// Opening a session while another is open drops the previous one
    /// uncommitted.
    pub fn begin_edit(&mut self, key: RowKey, column: &str) -> Result<EditSession, EditError> {
        if self.row(key).is_none() {
            return Err(EditError::UnknownRow { key: key.0 });
        }
        let var = self
            .schema
            .column(column)
            .ok_or_else(|| EditError::UnknownColumn {
                name: column.to_string(),
            })?;
        let session = EditSession {
            row: key,
            column: var.name.clone(),
            editor: CellEditor::for_type(var.var_type),
        };
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Commit the open session with the typed input (blur or Enter).
    ///
    /// The input is validated and normalized by the cell's editor, written
    /// through to the row, and the save listener is notified with the full
    /// snapshot. Committing into the last schema column of the last row
    /// auto-appends a blank scratch row, so the grid always has a trailing
    /// row while being edited manually. On editor rejection the session
    /// stays open with the cell unchanged.
    pub fn commit(&mut self, input: &str) -> Result<(), EditError> {
        let session = self.session.clone().ok_or(EditError::NoActiveEdit)?;
        let value = session.editor.normalize(input)?;

        let row = self
            .rows
            .iter_mut()
            .find(|r| r.key == session.row)
            .ok_or(EditError::UnknownRow { key: session.row.0 })?;
        row.set(session.column.clone(), value);
        self.session = None;

        let is_last_row = self.rows.last().map(|r| r.key) == Some(session.row);
        let is_last_column = self
            .schema
            .columns()
            .last()
            .map(|c| c.name == session.column)
            .unwrap_or(false);
        if is_last_row && is_last_column {
            let key = self.push_blank_row();
            debug!(%key, "scratch row appended");
        }

        self.notify();
        Ok(())
    }

    /// Drop the open session without writing anything.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        self.session.take().map(|_| ()).ok_or(EditError::NoActiveEdit)
    }

    /// Append a blank row with a fresh key and notify the listener.
    pub fn add_row(&mut self) -> RowKey {
        let key = self.push_blank_row();
        self.notify();
        key
    }

    /// Delete a row behind a confirmation prompt.
    ///
    /// `confirm` models the prompt; it sees the row about to be removed and
    /// the deletion only happens when it returns true. Remaining rows keep
    /// their keys (display order compacts, identity does not shift).
    /// Returns whether the row was removed.
    pub fn delete_row(
        &mut self,
        key: RowKey,
        confirm: impl FnOnce(&TableRow) -> bool,
    ) -> Result<bool, EditError> {
        let index = self
            .rows
            .iter()
            .position(|r| r.key == key)
            .ok_or(EditError::UnknownRow { key: key.0 })?;
        if !confirm(&self.rows[index]) {
            return Ok(false);
        }
        if self.session.as_ref().map(|s| s.row) == Some(key) {
            self.session = None;
        }
        self.rows.remove(index);
        debug!(%key, "row deleted");
        self.notify();
        Ok(true)
    }

    fn push_blank_row(&mut self) -> RowKey {
        let mut row = TableRow::empty(self.keys.mint());
        for column in self.schema.columns() {
            row.values.insert(column.name.clone(), String::new());
        }
        let key = row.key;
        self.rows.push(row);
        key
    }

    fn notify(&self) {
        if let Some(listener) = &self.on_save {
            listener(&self.rows);
        }
    }
}
