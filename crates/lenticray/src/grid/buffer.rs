//! The in-memory copy of the resident page.

use serde::Serialize;
use tracing::debug;

use crate::error::{LenticrayError, Result};
use crate::model::{CellValue, ColumnDef, ColumnKind, Row};

/// Unsaved-change tracking for one editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EditState {
    /// Local edits exist that the server has not seen.
    pub dirty: bool,
    /// A save request is in flight.
    pub saving: bool,
}

/// Mutable table mirroring the current page. Never touches the network.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
    state: EditState,
}

impl EditBuffer {
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            state: EditState::default(),
        }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: usize) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Set one cell and mark the buffer dirty.
    ///
    /// Ignored while a save is in flight.
    pub fn apply_edit(
        &mut self,
        row_id: usize,
        column_key: &str,
        value: CellValue,
    ) -> Result<EditState> {
        if self.state.saving {
            debug!(row_id, column_key, "edit ignored while saving");
            return Ok(self.state);
        }

        let column = self
            .columns
            .iter()
            .find(|c| c.key == column_key)
            .ok_or_else(|| LenticrayError::UnknownColumn(column_key.to_string()))?;
        if column.kind == ColumnKind::Display {
            return Err(LenticrayError::ReadOnlyColumn(column_key.to_string()));
        }

        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or(LenticrayError::UnknownRow(row_id))?;

        row.cells.insert(column_key.to_string(), value.sanitized());
        self.state.dirty = true;
        Ok(self.state)
    }

    /// Forget that edits happened, keeping the edited contents.
    pub fn reset(&mut self) -> EditState {
        self.state.dirty = false;
        self.state
    }

    /// Swap in a freshly loaded or blank page.
    pub(crate) fn replace(&mut self, columns: Vec<ColumnDef>, rows: Vec<Row>) {
        self.columns = columns;
        self.rows = rows;
        self.state.dirty = false;
    }

    pub(crate) fn set_saving(&mut self, saving: bool) {
        self.state.saving = saving;
    }
}
