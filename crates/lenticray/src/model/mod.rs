//! Domain types shared by the API client and the grid editor.

mod column;
mod entity;
mod row;
mod value;

pub use column::{ColumnDef, ColumnKind, columns_for};
pub use entity::{Dataset, Project, Variable};
pub use row::{Row, WireRow};
pub use value::CellValue;

/// Reserved date column present in every dataset.
pub const SAMPLE_DATE: &str = "Sample Date";

/// Derived display column holding the owning project's name.
pub const WATER_BODY: &str = "Water Body";

/// Rows per page, the unit of editing and persistence.
pub const DEFAULT_PAGE_SIZE: usize = 100;
