//! Cell input rules, independent of any UI.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CellError;
use crate::model::{CellValue, ColumnDef, ColumnKind, Row};

/// What a numeric cell may contain while it is being typed.
static NUMERIC_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]*(\.[0-9]*)?$").expect("numeric input pattern"));

/// Whether `candidate` may replace the text of an in-progress edit.
///
/// Numeric cells only ever hold digits, one optional leading `-` and one
/// optional `.`; anything else is refused keystroke by keystroke.
pub fn accepts_keystroke(kind: ColumnKind, candidate: &str) -> bool {
    match kind {
        ColumnKind::Numeric => NUMERIC_INPUT.is_match(candidate),
        ColumnKind::Date | ColumnKind::Display => true,
    }
}

/// Convert committed text into a cell value.
///
/// Blank input is always `Null`. Numeric input parses as `f64`; date input
/// is kept verbatim until save-time validation.
pub fn parse_candidate(kind: ColumnKind, raw: &str) -> Result<CellValue, CellError> {
    if raw.trim().is_empty() {
        return Ok(CellValue::Null);
    }

    match kind {
        ColumnKind::Numeric => {
            if !NUMERIC_INPUT.is_match(raw) {
                return Err(CellError::NotNumeric(raw.to_string()));
            }
            raw.parse::<f64>()
                .map(CellValue::Number)
                .map_err(|_| CellError::Incomplete(raw.to_string()))
        }
        ColumnKind::Date | ColumnKind::Display => Ok(CellValue::Text(raw.to_string())),
    }
}

/// Keys that end an in-progress edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Commit, same as losing focus.
    Enter,
    /// Drop the in-progress text.
    Escape,
}

/// Result of closing a [`CellEditor`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Commit {
        row_id: usize,
        column: String,
        value: CellValue,
    },
    Discard,
}

/// An in-progress edit of one cell.
#[derive(Debug, Clone)]
pub struct CellEditor {
    row_id: usize,
    column: String,
    kind: ColumnKind,
    text: String,
}

impl CellEditor {
    /// Start editing with the cell's current value as text.
    pub fn open(row: &Row, column: &ColumnDef) -> Self {
        Self {
            row_id: row.id,
            column: column.key.clone(),
            kind: column.kind,
            text: row.display(&column.key),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Offer new text; returns false (text unchanged) if the cell refuses it.
    pub fn input(&mut self, candidate: &str) -> bool {
        if accepts_keystroke(self.kind, candidate) {
            self.text = candidate.to_string();
            true
        } else {
            false
        }
    }

    /// Handle a closing key.
    pub fn press(self, key: EditorKey) -> Result<EditOutcome, CellError> {
        match key {
            EditorKey::Enter => self.blur(),
            EditorKey::Escape => Ok(EditOutcome::Discard),
        }
    }

    /// Commit the current text.
    pub fn blur(self) -> Result<EditOutcome, CellError> {
        let value = parse_candidate(self.kind, &self.text)?;
        Ok(EditOutcome::Commit {
            row_id: self.row_id,
            column: self.column,
            value,
        })
    }
}
