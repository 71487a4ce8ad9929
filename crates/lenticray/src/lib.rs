//! Lenticray: headless client for the Lenticray water-quality platform.
//!
//! The centrepiece is the dataset grid editor: one fixed-size page of
//! measurements at a time, with unsaved-change tracking, client-side
//! validation before submission, and whole-dataset CSV exchange. All domain
//! computation stays on the server; this crate only moves and checks data.
//!
//! # Core Principles
//!
//! - **One resident page**: edits live in memory until saved or discarded
//! - **All-or-nothing saves**: the first invalid row blocks the whole page
//! - **Explicit context**: credentials and navigation decisions are injected
//!
//! # Example
//!
//! ```no_run
//! use lenticray::{ApiConfig, DatasetEditor, FixedGuard, GuardDecision, HttpApi, Session};
//!
//! let api = HttpApi::new(ApiConfig::from_env().unwrap(), Session::from_env().unwrap()).unwrap();
//! let mut editor =
//!     DatasetEditor::open(api, FixedGuard(GuardDecision::Save), "dataset-id").unwrap();
//!
//! editor.set_cell(0, "Sample Date", "2024-03-01").unwrap();
//! editor.set_cell(0, "TEMP", "18.4").unwrap();
//! let report = editor.save().unwrap();
//! println!("Saved {} rows on page {}", report.rows_sent, report.page_number);
//! ```

pub mod api;
pub mod error;
pub mod exchange;
pub mod grid;
pub mod model;

pub use api::{ApiConfig, DataPage, DatasetApi, HttpApi, MockApi, MockCall, PageUpdate, Session};
pub use error::{CellError, LenticrayError, Result, ValidationError};
pub use exchange::{CsvDownload, CsvUpload};
pub use grid::{
    CellEditor, DatasetEditor, EditOutcome, EditState, EditorKey, FixedGuard, GuardDecision,
    GuardOutcome, NavigationGuard, PendingAction, SaveReport, ScriptedGuard, UploadReport,
};
pub use model::{
    CellValue, ColumnDef, ColumnKind, DEFAULT_PAGE_SIZE, Dataset, Project, Row, SAMPLE_DATE,
    Variable, WATER_BODY, WireRow,
};
