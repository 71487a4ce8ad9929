//! Page sanitization and validation before submission.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{LenticrayError, Result, ValidationError};
use crate::model::{CellValue, Row, SAMPLE_DATE, WATER_BODY, WireRow};

static DATE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date pattern"));

/// `YYYY-MM-DD` naming a real calendar day.
pub fn is_valid_sample_date(value: &str) -> bool {
    DATE_SHAPE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Parse a variable cell, accepting numbers and numeric text.
fn numeric_value(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Null => None,
    }
    .filter(|n| n.is_finite())
}

/// Sanitize and validate one non-empty row into its wire form.
pub fn validate_row(
    row: &Row,
    water_body: &str,
) -> std::result::Result<WireRow, ValidationError> {
    let row_number = row.id + 1;
    let mut wire = WireRow::with_capacity(row.cells.len() + 1);
    wire.insert(WATER_BODY.to_string(), CellValue::Text(water_body.to_string()));

    let mut has_date = false;
    let mut has_variable_data = false;

    for (key, value) in &row.cells {
        let value = value.clone().sanitized();
        let value = if key == SAMPLE_DATE {
            match value {
                CellValue::Null => CellValue::Null,
                other => {
                    let text = other.to_string().trim().to_string();
                    if !is_valid_sample_date(&text) {
                        return Err(ValidationError::InvalidDate {
                            row: row_number,
                            value: text,
                        });
                    }
                    has_date = true;
                    CellValue::Text(text)
                }
            }
        } else if value.is_blank() {
            CellValue::Null
        } else {
            let n = numeric_value(&value).ok_or_else(|| ValidationError::NonNumeric {
                row: row_number,
                column: key.clone(),
                value: value.to_string(),
            })?;
            has_variable_data = true;
            CellValue::Number(n)
        };
        wire.insert(key.clone(), value);
    }

    if has_variable_data && !has_date {
        return Err(ValidationError::MissingDate { row: row_number });
    }

    Ok(wire)
}

/// Build the `data` array for a page save.
///
/// Blank rows are skipped. The first invalid row aborts the whole page; an
/// all-blank page is [`LenticrayError::EmptySubmission`].
pub fn prepare_submission(rows: &[Row], water_body: &str) -> Result<Vec<WireRow>> {
    let data = rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| validate_row(row, water_body))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if data.is_empty() {
        return Err(LenticrayError::EmptySubmission);
    }
    Ok(data)
}
