//! Grid column definitions.

use serde::{Deserialize, Serialize};

use super::entity::{Dataset, Variable};
use super::{SAMPLE_DATE, WATER_BODY};

/// How a column's cells are edited and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text, must be `YYYY-MM-DD` at save time.
    Date,
    /// Floating point measurement.
    Numeric,
    /// Derived, read-only.
    Display,
}

/// A single grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Key into row data.
    pub key: String,
    /// Header shown to the user.
    pub label: String,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn sample_date() -> Self {
        Self {
            key: SAMPLE_DATE.to_string(),
            label: SAMPLE_DATE.to_string(),
            kind: ColumnKind::Date,
        }
    }

    pub fn variable(variable: &Variable) -> Self {
        Self {
            key: variable.id.clone(),
            label: variable.label(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn water_body() -> Self {
        Self {
            key: WATER_BODY.to_string(),
            label: WATER_BODY.to_string(),
            kind: ColumnKind::Display,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.kind != ColumnKind::Display
    }
}

/// Columns for a dataset: `Sample Date`, one per variable, then `Water Body`.
pub fn columns_for(dataset: &Dataset) -> Vec<ColumnDef> {
    let mut columns = Vec::with_capacity(dataset.variables.len() + 2);
    columns.push(ColumnDef::sample_date());
    columns.extend(dataset.variables.iter().map(ColumnDef::variable));
    columns.push(ColumnDef::water_body());
    columns
}
