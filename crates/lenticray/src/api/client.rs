//! API client trait and wire types.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::exchange::{CsvDownload, CsvUpload};
use crate::model::{Dataset, Project, WireRow};

/// One page of dataset rows as returned by `GET /datasets/{id}/data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPage {
    pub data: Vec<WireRow>,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
}

/// Body of `PUT /datasets/{id}/data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageUpdate {
    pub page_size: usize,
    pub page_number: usize,
    pub data: Vec<WireRow>,
}

/// Operations the grid editor needs from the Lenticray API.
///
/// Implementations must be thread-safe (Send + Sync) so one client can be
/// shared between editor sessions.
pub trait DatasetApi: Send + Sync {
    /// `GET /projects/`
    fn list_projects(&self) -> Result<Vec<Project>>;

    /// `GET /datasets/?project_id=`
    fn list_datasets(&self, project_id: &str) -> Result<Vec<Dataset>>;

    /// `GET /datasets/{id}`
    fn get_dataset(&self, dataset_id: &str) -> Result<Dataset>;

    /// `GET /projects/{id}`
    fn get_project(&self, project_id: &str) -> Result<Project>;

    /// `GET /datasets/{id}/data?page_size&page_number`
    fn get_page(&self, dataset_id: &str, page_size: usize, page_number: usize)
    -> Result<DataPage>;

    /// `PUT /datasets/{id}/data`
    fn save_page(&self, dataset_id: &str, update: &PageUpdate) -> Result<()>;

    /// `POST /datasets/{id}/upload_csv` as multipart `file`.
    fn upload_csv(&self, dataset_id: &str, upload: &CsvUpload) -> Result<()>;

    /// `GET /datasets/{id}/download_csv`
    fn download_csv(&self, dataset_id: &str) -> Result<CsvDownload>;

    /// Name of this client (for logging/debugging).
    fn name(&self) -> &str;
}

impl<T: DatasetApi + ?Sized> DatasetApi for std::sync::Arc<T> {
    fn list_projects(&self) -> Result<Vec<Project>> {
        (**self).list_projects()
    }

    fn list_datasets(&self, project_id: &str) -> Result<Vec<Dataset>> {
        (**self).list_datasets(project_id)
    }

    fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        (**self).get_dataset(dataset_id)
    }

    fn get_project(&self, project_id: &str) -> Result<Project> {
        (**self).get_project(project_id)
    }

    fn get_page(
        &self,
        dataset_id: &str,
        page_size: usize,
        page_number: usize,
    ) -> Result<DataPage> {
        (**self).get_page(dataset_id, page_size, page_number)
    }

    fn save_page(&self, dataset_id: &str, update: &PageUpdate) -> Result<()> {
        (**self).save_page(dataset_id, update)
    }

    fn upload_csv(&self, dataset_id: &str, upload: &CsvUpload) -> Result<()> {
        (**self).upload_csv(dataset_id, upload)
    }

    fn download_csv(&self, dataset_id: &str) -> Result<CsvDownload> {
        (**self).download_csv(dataset_id)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
