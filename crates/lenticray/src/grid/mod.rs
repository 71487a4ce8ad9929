//! The dataset grid editor: page loading, edit buffer, validation and the
//! navigation guard that protects unsaved edits.

mod buffer;
mod cell;
mod editor;
mod guard;
mod loader;
mod validate;

pub use buffer::{EditBuffer, EditState};
pub use cell::{CellEditor, EditOutcome, EditorKey, accepts_keystroke, parse_candidate};
pub use editor::{DatasetEditor, SaveReport, UploadReport};
pub use guard::{
    FixedGuard, GuardDecision, GuardOutcome, NavigationGuard, PendingAction, ScriptedGuard,
};
pub use loader::{LoadedPage, empty_page, load_page, pad_rows};
pub use validate::{is_valid_sample_date, prepare_submission, validate_row};
