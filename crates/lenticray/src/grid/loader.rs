//! Page loading and padding.

use tracing::{debug, warn};

use crate::api::DatasetApi;
use crate::error::Result;
use crate::model::{ColumnDef, Dataset, Row, WireRow, columns_for};

/// Everything the editor needs to show one page.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub dataset: Dataset,
    /// Owning project's name.
    pub water_body: String,
    pub columns: Vec<ColumnDef>,
    /// Exactly `page_size` rows.
    pub rows: Vec<Row>,
    pub page_number: usize,
    /// At least 1.
    pub total_pages: usize,
}

/// Fetch dataset metadata, project name and one page of rows.
///
/// Nothing is returned unless every request succeeds.
pub fn load_page<A: DatasetApi + ?Sized>(
    api: &A,
    dataset_id: &str,
    page_number: usize,
    page_size: usize,
) -> Result<LoadedPage> {
    let dataset = api.get_dataset(dataset_id)?;
    let project = api.get_project(&dataset.project_id)?;
    let page = api.get_page(dataset_id, page_size, page_number)?;

    let columns = columns_for(&dataset);
    let rows = pad_rows(&page.data, &project.name, &columns, page_size);

    debug!(
        dataset = dataset_id,
        page = page_number,
        fetched = page.data.len(),
        total_pages = page.total_pages,
        "loaded page"
    );

    Ok(LoadedPage {
        dataset,
        water_body: project.name,
        columns,
        rows,
        page_number,
        total_pages: page.total_pages.max(1),
    })
}

/// Turn server rows into exactly `page_size` resident rows.
///
/// Short pages are padded with blank rows; ids run `0..page_size`.
pub fn pad_rows(
    data: &[WireRow],
    water_body: &str,
    columns: &[ColumnDef],
    page_size: usize,
) -> Vec<Row> {
    if data.len() > page_size {
        warn!(
            received = data.len(),
            page_size, "server returned more rows than the page size; extra rows ignored"
        );
    }

    let mut rows: Vec<Row> = data
        .iter()
        .take(page_size)
        .enumerate()
        .map(|(id, wire)| Row::from_wire(id, water_body, wire, columns))
        .collect();

    let fetched = rows.len();
    rows.extend((fetched..page_size).map(|id| Row::blank(id, water_body, columns)));
    rows
}

/// A page of blank rows, used for appending.
pub fn empty_page(water_body: &str, columns: &[ColumnDef], page_size: usize) -> Vec<Row> {
    pad_rows(&[], water_body, columns, page_size)
}
