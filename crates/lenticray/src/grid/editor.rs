//! Dataset grid editor session.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{DatasetApi, PageUpdate};
use crate::error::{LenticrayError, Result};
use crate::exchange::{CsvDownload, CsvUpload};
use crate::model::{CellValue, ColumnDef, DEFAULT_PAGE_SIZE, Dataset, Row};

use super::buffer::{EditBuffer, EditState};
use super::cell::{CellEditor, EditOutcome, parse_candidate};
use super::guard::{GuardDecision, GuardOutcome, NavigationGuard, PendingAction};
use super::loader::{LoadedPage, empty_page, load_page};
use super::validate::prepare_submission;

/// Summary of a successful page save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub page_number: usize,
    /// Non-empty rows transmitted.
    pub rows_sent: usize,
    /// False when the page was saved but could not be fetched again.
    pub reloaded: bool,
}

/// Summary of a successful CSV upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub file_name: String,
    pub rows: usize,
    pub hash: String,
    /// False when the upload succeeded but page 1 could not be fetched.
    pub reloaded: bool,
}

/// One editing session over one dataset.
///
/// Holds exactly one page in its [`EditBuffer`]. Page turns, page appends
/// and CSV uploads ask the [`NavigationGuard`] first whenever the buffer is
/// dirty and no save is in flight.
///
/// After a server-side change whose reload failed, the page is *stale*: the
/// buffer holds blank rows and saving is refused until a fetch succeeds.
pub struct DatasetEditor<A, G> {
    api: A,
    guard: G,
    dataset_id: String,
    dataset: Dataset,
    water_body: String,
    page_size: usize,
    page_number: usize,
    total_pages: usize,
    buffer: EditBuffer,
    stale: bool,
}

impl<A: DatasetApi, G: NavigationGuard> DatasetEditor<A, G> {
    /// Open a dataset on page 1 with the default page size.
    pub fn open(api: A, guard: G, dataset_id: impl Into<String>) -> Result<Self> {
        Self::open_at(api, guard, dataset_id, 1, DEFAULT_PAGE_SIZE)
    }

    /// Open a dataset on a given page.
    pub fn open_at(
        api: A,
        guard: G,
        dataset_id: impl Into<String>,
        page_number: usize,
        page_size: usize,
    ) -> Result<Self> {
        if page_size == 0 {
            return Err(LenticrayError::Config("page size must be positive".to_string()));
        }
        if page_number == 0 {
            return Err(LenticrayError::InvalidPage {
                page: 0,
                total_pages: 1,
            });
        }

        let dataset_id = dataset_id.into();
        let loaded = load_page(&api, &dataset_id, page_number, page_size)?;

        Ok(Self {
            api,
            guard,
            dataset_id,
            dataset: loaded.dataset,
            water_body: loaded.water_body,
            page_size,
            page_number: loaded.page_number,
            total_pages: loaded.total_pages,
            buffer: EditBuffer::new(loaded.columns, loaded.rows),
            stale: false,
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut G {
        &mut self.guard
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn water_body(&self) -> &str {
        &self.water_body
    }

    pub fn columns(&self) -> &[ColumnDef] {
        self.buffer.columns()
    }

    pub fn rows(&self) -> &[Row] {
        self.buffer.rows()
    }

    pub fn row(&self, id: usize) -> Option<&Row> {
        self.buffer.row(id)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn state(&self) -> EditState {
        self.buffer.state()
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.state().dirty
    }

    /// True when the resident page may not match the server.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether closing now should show an unsaved-changes warning.
    pub fn should_warn_on_close(&self) -> bool {
        self.is_dirty()
    }

    // ---- editing -------------------------------------------------------

    /// Set a cell to an already-parsed value.
    pub fn apply_edit(
        &mut self,
        row_id: usize,
        column_key: &str,
        value: CellValue,
    ) -> Result<EditState> {
        self.buffer.apply_edit(row_id, column_key, value)
    }

    /// Set a cell from raw text using the column's input rules.
    pub fn set_cell(&mut self, row_id: usize, column_key: &str, raw: &str) -> Result<EditState> {
        let column = self
            .buffer
            .column(column_key)
            .ok_or_else(|| LenticrayError::UnknownColumn(column_key.to_string()))?;
        let value = parse_candidate(column.kind, raw).map_err(|source| LenticrayError::Cell {
            column: column_key.to_string(),
            source,
        })?;
        self.apply_edit(row_id, column_key, value)
    }

    /// Start an in-progress edit of one cell.
    pub fn begin_edit(&self, row_id: usize, column_key: &str) -> Result<CellEditor> {
        let column = self
            .buffer
            .column(column_key)
            .ok_or_else(|| LenticrayError::UnknownColumn(column_key.to_string()))?;
        if !column.is_editable() {
            return Err(LenticrayError::ReadOnlyColumn(column_key.to_string()));
        }
        let row = self
            .buffer
            .row(row_id)
            .ok_or(LenticrayError::UnknownRow(row_id))?;
        Ok(CellEditor::open(row, column))
    }

    /// Apply the outcome of a closed [`CellEditor`].
    pub fn finish_edit(&mut self, outcome: EditOutcome) -> Result<EditState> {
        match outcome {
            EditOutcome::Commit {
                row_id,
                column,
                value,
            } => self.apply_edit(row_id, &column, value),
            EditOutcome::Discard => Ok(self.state()),
        }
    }

    /// Clear the dirty flag without reloading.
    pub fn reset(&mut self) -> EditState {
        self.buffer.reset()
    }

    // ---- saving --------------------------------------------------------

    /// Validate and submit the resident page, then reload it.
    ///
    /// Validation failures are reported before any request is sent. On any
    /// failure the buffer and dirty flag are left as they were. Once the
    /// server has accepted the page the save succeeds; a failed reload only
    /// clears [`SaveReport::reloaded`].
    pub fn save(&mut self) -> Result<SaveReport> {
        let mut report = self.persist()?;
        if let Err(e) = self.reload() {
            warn!(
                dataset = %self.dataset_id,
                page = self.page_number,
                error = %e,
                "page saved but reload failed"
            );
            report.reloaded = false;
        }
        Ok(report)
    }

    /// Fetch the resident page again, dropping local edits.
    pub fn refresh(&mut self) -> Result<()> {
        self.reload()
    }

    fn persist(&mut self) -> Result<SaveReport> {
        if self.stale {
            return Err(LenticrayError::StalePage);
        }

        self.buffer.set_saving(true);
        let result = self.submit();
        self.buffer.set_saving(false);

        match &result {
            Ok(report) => {
                self.buffer.reset();
                info!(
                    dataset = %self.dataset_id,
                    page = report.page_number,
                    rows = report.rows_sent,
                    "page saved"
                );
            }
            Err(e) => warn!(
                dataset = %self.dataset_id,
                page = self.page_number,
                error = %e,
                "save failed"
            ),
        }
        result
    }

    fn submit(&self) -> Result<SaveReport> {
        let data = prepare_submission(self.buffer.rows(), &self.water_body)?;
        let update = PageUpdate {
            page_size: self.page_size,
            page_number: self.page_number,
            data,
        };
        self.api.save_page(&self.dataset_id, &update)?;

        Ok(SaveReport {
            page_number: self.page_number,
            rows_sent: update.data.len(),
            reloaded: true,
        })
    }

    // ---- navigation ----------------------------------------------------

    /// Resolve unsaved edits before `action` replaces the page.
    ///
    /// `Ok` means the action may proceed. With [`GuardDecision::Discard`]
    /// the edits stay in the buffer until the action replaces it, so a
    /// failing action still leaves them intact.
    pub fn navigate_away_guard(&mut self, action: PendingAction) -> Result<GuardOutcome> {
        let state = self.buffer.state();
        if !state.dirty || state.saving {
            return Ok(GuardOutcome::Clean);
        }

        match self.guard.decide(&action) {
            GuardDecision::Save => {
                self.persist()?;
                Ok(GuardOutcome::Saved)
            }
            GuardDecision::Discard => {
                debug!(%action, "discarding unsaved edits");
                Ok(GuardOutcome::Discarded)
            }
            GuardDecision::Cancel => {
                warn!(%action, "cancelled to keep unsaved edits");
                Err(LenticrayError::Cancelled(action.to_string()))
            }
        }
    }

    /// Move to page `page_number` (`1..=total_pages`).
    pub fn goto_page(&mut self, page_number: usize) -> Result<()> {
        if page_number == 0 || page_number > self.total_pages {
            return Err(LenticrayError::InvalidPage {
                page: page_number,
                total_pages: self.total_pages,
            });
        }

        self.navigate_away_guard(PendingAction::PageTurn {
            from: self.page_number,
            to: page_number,
        })?;
        self.fetch(page_number)
    }

    pub fn first_page(&mut self) -> Result<()> {
        self.goto_page(1)
    }

    pub fn previous_page(&mut self) -> Result<()> {
        self.goto_page(self.page_number.saturating_sub(1))
    }

    pub fn next_page(&mut self) -> Result<()> {
        self.goto_page(self.page_number + 1)
    }

    pub fn last_page(&mut self) -> Result<()> {
        self.goto_page(self.total_pages)
    }

    /// Start a new, unsaved page after the last one.
    ///
    /// Nothing is fetched or persisted until [`save`](Self::save).
    pub fn add_page(&mut self) -> Result<()> {
        let outcome = self.navigate_away_guard(PendingAction::AddPage)?;
        if outcome == GuardOutcome::Saved || self.stale {
            // page count must reflect what the server holds now
            self.reload()?;
        }

        self.page_number = self.total_pages + 1;
        let rows = empty_page(&self.water_body, self.buffer.columns(), self.page_size);
        let columns = self.buffer.columns().to_vec();
        self.buffer.replace(columns, rows);
        debug!(dataset = %self.dataset_id, page = self.page_number, "appended blank page");
        Ok(())
    }

    /// Re-fetch the resident page from the server, dropping local edits.
    fn reload(&mut self) -> Result<()> {
        self.fetch(self.page_number)
    }

    fn fetch(&mut self, page_number: usize) -> Result<()> {
        let loaded = load_page(&self.api, &self.dataset_id, page_number, self.page_size)?;
        self.install(loaded);
        Ok(())
    }

    fn install(&mut self, loaded: LoadedPage) {
        self.dataset = loaded.dataset;
        self.water_body = loaded.water_body;
        self.page_number = loaded.page_number;
        self.total_pages = loaded.total_pages;
        self.buffer.replace(loaded.columns, loaded.rows);
        self.stale = false;
    }

    // ---- CSV exchange --------------------------------------------------

    /// Replace the dataset with a CSV file from disk.
    pub fn upload_csv(&mut self, path: impl AsRef<Path>) -> Result<UploadReport> {
        self.navigate_away_guard(PendingAction::UploadCsv)?;
        let upload = CsvUpload::from_path(path, &self.dataset)?;
        self.send_upload(upload)
    }

    /// Replace the dataset with in-memory CSV contents.
    pub fn upload_csv_bytes(
        &mut self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<UploadReport> {
        self.navigate_away_guard(PendingAction::UploadCsv)?;
        let upload = CsvUpload::from_bytes(file_name, bytes, &self.dataset)?;
        self.send_upload(upload)
    }

    fn send_upload(&mut self, upload: CsvUpload) -> Result<UploadReport> {
        self.api.upload_csv(&self.dataset_id, &upload)?;
        info!(
            dataset = %self.dataset_id,
            file = %upload.file_name,
            rows = upload.row_count,
            hash = %upload.hash,
            "CSV uploaded"
        );

        let reloaded = match self.fetch(1) {
            Ok(()) => true,
            Err(e) => {
                warn!(dataset = %self.dataset_id, error = %e, "CSV uploaded but reload failed");
                self.mark_stale();
                false
            }
        };

        Ok(UploadReport {
            file_name: upload.file_name,
            rows: upload.row_count,
            hash: upload.hash,
            reloaded,
        })
    }

    /// Drop rows that no longer match the server and block saving.
    fn mark_stale(&mut self) {
        self.page_number = 1;
        self.total_pages = 1;
        let rows = empty_page(&self.water_body, self.buffer.columns(), self.page_size);
        let columns = self.buffer.columns().to_vec();
        self.buffer.replace(columns, rows);
        self.stale = true;
    }

    /// Export the whole dataset as CSV.
    pub fn download_csv(&self) -> Result<CsvDownload> {
        let download = self.api.download_csv(&self.dataset_id)?;
        info!(
            dataset = %self.dataset_id,
            file = %download.file_name,
            bytes = download.bytes.len(),
            "CSV downloaded"
        );
        Ok(download)
    }
}
