//! In-memory API for testing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{LenticrayError, Result};
use crate::exchange::{CsvDownload, CsvUpload};
use crate::model::{CellValue, Dataset, Project, SAMPLE_DATE, WATER_BODY, WireRow};

use super::client::{DataPage, DatasetApi, PageUpdate};

/// A request observed by [`MockApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListProjects,
    ListDatasets(String),
    GetDataset(String),
    GetProject(String),
    GetPage { page_size: usize, page_number: usize },
    SavePage(PageUpdate),
    UploadCsv { file_name: String, rows: usize },
    DownloadCsv,
}

#[derive(Default)]
struct MockState {
    projects: Vec<Project>,
    datasets: Vec<Dataset>,
    rows: HashMap<String, Vec<WireRow>>,
    calls: Vec<MockCall>,
    failures: Vec<ScheduledFailure>,
}

/// A server error returned once `skip` more calls have gone through.
struct ScheduledFailure {
    skip: usize,
    status: u16,
    message: String,
}

/// Mock API that keeps dataset rows in memory and records every call.
///
/// Saving a page replaces that page's window of stored rows with the
/// submitted rows; pages past the end are appended. Uploading a CSV replaces
/// every stored row of the dataset.
#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, project: Project) -> Self {
        self.lock().projects.push(project);
        self
    }

    pub fn with_dataset(self, dataset: Dataset) -> Self {
        {
            let mut state = self.lock();
            state.rows.entry(dataset.id.clone()).or_default();
            state.datasets.push(dataset);
        }
        self
    }

    /// Seed stored rows for a dataset.
    pub fn with_rows(self, dataset_id: &str, rows: Vec<WireRow>) -> Self {
        self.lock().rows.insert(dataset_id.to_string(), rows);
        self
    }

    /// Make the next request fail with the given status and detail.
    pub fn fail_next(&self, status: u16, detail: impl Into<String>) {
        self.fail_after(0, status, detail);
    }

    /// Let `skip` requests succeed, then fail the one after with the given
    /// status and detail.
    pub fn fail_after(&self, skip: usize, status: u16, detail: impl Into<String>) {
        self.lock().failures.push(ScheduledFailure {
            skip,
            status,
            message: detail.into(),
        });
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Page updates received so far.
    pub fn saved_pages(&self) -> Vec<PageUpdate> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::SavePage(update) => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    /// Currently stored rows for a dataset.
    pub fn stored_rows(&self, dataset_id: &str) -> Vec<WireRow> {
        self.lock().rows.get(dataset_id).cloned().unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and apply any scheduled failure.
    fn begin(&self, call: MockCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failures.first_mut() {
            Some(failure) if failure.skip > 0 => failure.skip -= 1,
            Some(_) => {
                let failure = state.failures.remove(0);
                return Err(LenticrayError::Server {
                    status: failure.status,
                    message: failure.message,
                });
            }
            None => {}
        }
        Ok(state)
    }
}

fn not_found(what: &str, id: &str) -> LenticrayError {
    LenticrayError::Server {
        status: 404,
        message: format!("{} {} not found", what, id),
    }
}

fn find_dataset<'a>(state: &'a MockState, dataset_id: &str) -> Result<&'a Dataset> {
    state
        .datasets
        .iter()
        .find(|d| d.id == dataset_id)
        .ok_or_else(|| not_found("Dataset", dataset_id))
}

fn water_body(state: &MockState, dataset: &Dataset) -> String {
    state
        .projects
        .iter()
        .find(|p| p.id == dataset.project_id)
        .map(|p| p.name.clone())
        .unwrap_or_default()
}

impl DatasetApi for MockApi {
    fn list_projects(&self) -> Result<Vec<Project>> {
        let state = self.begin(MockCall::ListProjects)?;
        Ok(state.projects.clone())
    }

    fn list_datasets(&self, project_id: &str) -> Result<Vec<Dataset>> {
        let state = self.begin(MockCall::ListDatasets(project_id.to_string()))?;
        Ok(state
            .datasets
            .iter()
            .filter(|d| d.project_id == project_id)
            .cloned()
            .collect())
    }

    fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let state = self.begin(MockCall::GetDataset(dataset_id.to_string()))?;
        find_dataset(&state, dataset_id).cloned()
    }

    fn get_project(&self, project_id: &str) -> Result<Project> {
        let state = self.begin(MockCall::GetProject(project_id.to_string()))?;
        state
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| not_found("Project", project_id))
    }

    fn get_page(
        &self,
        dataset_id: &str,
        page_size: usize,
        page_number: usize,
    ) -> Result<DataPage> {
        let state = self.begin(MockCall::GetPage {
            page_size,
            page_number,
        })?;
        find_dataset(&state, dataset_id)?;

        let rows = state.rows.get(dataset_id).map(Vec::as_slice).unwrap_or(&[]);
        let total_rows = rows.len();
        let total_pages = total_rows.div_ceil(page_size.max(1));
        let start = page_number.saturating_sub(1) * page_size;
        let data = rows.iter().skip(start).take(page_size).cloned().collect();

        Ok(DataPage {
            data,
            total_pages,
            total_rows: Some(total_rows),
            page_size: Some(page_size),
            page_number: Some(page_number),
        })
    }

    fn save_page(&self, dataset_id: &str, update: &PageUpdate) -> Result<()> {
        let mut state = self.begin(MockCall::SavePage(update.clone()))?;
        find_dataset(&state, dataset_id)?;

        if update.data.len() > update.page_size {
            return Err(LenticrayError::Server {
                status: 400,
                message: "page data exceeds page size".to_string(),
            });
        }

        let rows = state.rows.entry(dataset_id.to_string()).or_default();
        let start = update.page_number.saturating_sub(1) * update.page_size;
        if start >= rows.len() {
            rows.extend(update.data.iter().cloned());
        } else {
            let end = (start + update.page_size).min(rows.len());
            rows.splice(start..end, update.data.iter().cloned());
        }
        Ok(())
    }

    fn upload_csv(&self, dataset_id: &str, upload: &CsvUpload) -> Result<()> {
        let mut state = self.begin(MockCall::UploadCsv {
            file_name: upload.file_name.clone(),
            rows: upload.row_count,
        })?;
        let dataset = find_dataset(&state, dataset_id)?.clone();
        let water_body = water_body(&state, &dataset);

        let mut reader = csv::Reader::from_reader(upload.bytes.as_slice());
        let headers = reader.headers()?.clone();
        let mut keys = vec![SAMPLE_DATE.to_string()];
        keys.extend(dataset.variable_ids().map(str::to_string));

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row = WireRow::new();
            row.insert(WATER_BODY.to_string(), CellValue::Text(water_body.clone()));
            for key in &keys {
                let raw = headers
                    .iter()
                    .position(|h| h.trim() == key)
                    .and_then(|i| record.get(i))
                    .unwrap_or("");
                let value = if key == SAMPLE_DATE {
                    CellValue::from_text(raw.trim())
                } else {
                    raw.trim()
                        .parse::<f64>()
                        .map(CellValue::Number)
                        .unwrap_or_else(|_| CellValue::from_text(raw))
                };
                row.insert(key.clone(), value);
            }
            let has_values = row
                .iter()
                .any(|(k, v)| k != WATER_BODY && k != SAMPLE_DATE && !v.is_blank());
            if has_values {
                rows.push(row);
            }
        }

        state.rows.insert(dataset_id.to_string(), rows);
        Ok(())
    }

    fn download_csv(&self, dataset_id: &str) -> Result<CsvDownload> {
        let state = self.begin(MockCall::DownloadCsv)?;
        let dataset = find_dataset(&state, dataset_id)?;

        let mut keys = vec![SAMPLE_DATE.to_string()];
        keys.extend(dataset.variable_ids().map(str::to_string));

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&keys)?;
        for row in state.rows.get(dataset_id).into_iter().flatten() {
            writer.write_record(
                keys.iter()
                    .map(|k| row.get(k).map(CellValue::to_string).unwrap_or_default()),
            )?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| LenticrayError::InvalidCsv(e.to_string()))?;

        let disposition = format!(
            "attachment; filename={}.csv",
            dataset.name.replace(' ', "_").to_lowercase()
        );
        Ok(CsvDownload::new(Some(&disposition), bytes))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
