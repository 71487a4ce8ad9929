//! Grid rows and their wire representation.

use indexmap::IndexMap;

use super::column::{ColumnDef, ColumnKind};
use super::value::CellValue;
use super::WATER_BODY;

/// A row as exchanged with the API, keyed by column key.
pub type WireRow = IndexMap<String, CellValue>;

/// A row resident in the edit buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Local sequence id (`0..page_size`), grid identity only.
    pub id: usize,
    /// Derived from the project name; never edited.
    pub water_body: String,
    /// Editable cells in column order.
    pub cells: IndexMap<String, CellValue>,
}

impl Row {
    /// A padding row: every editable cell blank.
    pub fn blank(id: usize, water_body: &str, columns: &[ColumnDef]) -> Self {
        let cells = columns
            .iter()
            .filter(|c| c.kind != ColumnKind::Display)
            .map(|c| (c.key.clone(), CellValue::Null))
            .collect();

        Self {
            id,
            water_body: water_body.to_string(),
            cells,
        }
    }

    /// Build a resident row from server data, keeping only known columns.
    ///
    /// Any `Water Body` the server sent is replaced by `water_body`.
    pub fn from_wire(id: usize, water_body: &str, wire: &WireRow, columns: &[ColumnDef]) -> Self {
        let mut row = Self::blank(id, water_body, columns);
        for (key, cell) in row.cells.iter_mut() {
            if let Some(value) = wire.get(key) {
                *cell = value.clone().sanitized();
            }
        }
        row
    }

    /// Cell value for an editable column.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }

    /// Text shown in the grid for any column, including `Water Body`.
    pub fn display(&self, key: &str) -> String {
        if key == WATER_BODY {
            return self.water_body.clone();
        }
        self.cells.get(key).map(|v| v.to_string()).unwrap_or_default()
    }

    /// True when every field other than `id` and `Water Body` is blank.
    pub fn is_empty(&self) -> bool {
        self.cells.values().all(CellValue::is_blank)
    }
}
