//! Integration tests for the dataset grid editor against the in-memory API.

use std::io::Write;
use tempfile::NamedTempFile;

use lenticray::{
    CellValue, Dataset, DatasetEditor, EditorKey, EditOutcome, FixedGuard, GuardDecision,
    LenticrayError, MockApi, MockCall, PendingAction, Project, SAMPLE_DATE, ScriptedGuard,
    ValidationError, Variable, WATER_BODY, WireRow,
};

const DATASET: &str = "d-tota";
const WATER: &str = "Lago de Tota";

/// Mock API with one project, one dataset (TEMP, PH) and `rows` stored rows.
fn api_with_rows(rows: usize) -> MockApi {
    let stored = (0..rows)
        .map(|i| wire_row(&format!("2023-01-{:02}", i % 28 + 1), i as f64))
        .collect();

    MockApi::new()
        .with_project(Project {
            id: "p-tota".into(),
            name: WATER.into(),
            description: None,
        })
        .with_dataset(Dataset {
            id: DATASET.into(),
            name: "Tota 2023".into(),
            project_id: "p-tota".into(),
            variables: vec![
                Variable {
                    id: "TEMP".into(),
                    name: "Temperature".into(),
                    unit: "°C".into(),
                    description: Some("Water temperature".into()),
                },
                Variable {
                    id: "PH".into(),
                    name: "pH".into(),
                    unit: "".into(),
                    description: None,
                },
            ],
            rows: Some(rows as u64),
            date: None,
        })
        .with_rows(DATASET, stored)
}

fn wire_row(date: &str, temp: f64) -> WireRow {
    let mut row = WireRow::new();
    row.insert(WATER_BODY.into(), CellValue::Text(WATER.into()));
    row.insert(SAMPLE_DATE.into(), CellValue::Text(date.into()));
    row.insert("TEMP".into(), CellValue::Number(temp));
    row.insert("PH".into(), CellValue::Null);
    row
}

fn open(api: MockApi, guard: ScriptedGuard) -> DatasetEditor<MockApi, ScriptedGuard> {
    DatasetEditor::open(api, guard, DATASET).expect("open editor")
}

fn save_calls(api: &MockApi) -> usize {
    api.saved_pages().len()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_short_page_is_padded_to_page_size() {
    let editor = open(api_with_rows(3), ScriptedGuard::new([]));

    assert_eq!(editor.rows().len(), 100);
    assert_eq!(editor.total_pages(), 1);
    assert_eq!(editor.water_body(), WATER);
    for row in &editor.rows()[3..] {
        assert!(row.is_empty());
        assert_eq!(row.display(WATER_BODY), WATER);
    }
    assert_eq!(editor.rows()[2].get("TEMP"), Some(&CellValue::Number(2.0)));
    assert!(!editor.is_dirty());
}

#[test]
fn test_columns_follow_dataset_variables() {
    let editor = open(api_with_rows(1), ScriptedGuard::new([]));
    let labels: Vec<&str> = editor.columns().iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![SAMPLE_DATE, "TEMP - Temperature (°C)", "PH - pH ()", WATER_BODY]
    );
}

#[test]
fn test_empty_dataset_reports_one_page() {
    let editor = open(api_with_rows(0), ScriptedGuard::new([]));
    assert_eq!(editor.total_pages(), 1);
    assert!(editor.rows().iter().all(|r| r.is_empty()));
}

#[test]
fn test_open_fails_on_server_error() {
    let api = api_with_rows(3);
    api.fail_next(500, "database unavailable");
    let err = DatasetEditor::open(api, ScriptedGuard::new([]), DATASET)
        .err()
        .expect("open should fail");
    assert!(err.to_string().contains("database unavailable"));
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn test_numeric_cell_commit_and_keystroke_rejection() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));

    let mut cell = editor.begin_edit(10, "TEMP").unwrap();
    assert!(!cell.input("abc"));
    assert_eq!(cell.text(), "");
    assert!(cell.input("12.5"));
    let outcome = cell.blur().unwrap();
    let state = editor.finish_edit(outcome).unwrap();

    assert!(state.dirty);
    assert_eq!(editor.row(10).unwrap().get("TEMP"), Some(&CellValue::Number(12.5)));
}

#[test]
fn test_escape_leaves_buffer_clean() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));

    let mut cell = editor.begin_edit(0, "TEMP").unwrap();
    assert_eq!(cell.text(), "0");
    cell.input("99");
    let outcome = cell.press(EditorKey::Escape).unwrap();
    assert_eq!(outcome, EditOutcome::Discard);

    let state = editor.finish_edit(outcome).unwrap();
    assert!(!state.dirty);
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(0.0)));
}

#[test]
fn test_water_body_is_read_only() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    assert!(matches!(
        editor.begin_edit(0, WATER_BODY),
        Err(LenticrayError::ReadOnlyColumn(_))
    ));
    assert!(matches!(
        editor.set_cell(0, WATER_BODY, "Other lake"),
        Err(LenticrayError::ReadOnlyColumn(_))
    ));
    assert!(!editor.is_dirty());
}

#[test]
fn test_set_cell_rejects_incomplete_number() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    let err = editor.set_cell(0, "TEMP", "-").unwrap_err();
    assert!(matches!(err, LenticrayError::Cell { .. }));
    assert!(!editor.is_dirty());
}

#[test]
fn test_reset_clears_dirty_without_reloading() {
    let api = api_with_rows(3);
    let mut editor = open(api, ScriptedGuard::new([]));
    editor.api().clear_calls();

    editor.set_cell(0, "TEMP", "5").unwrap();
    let state = editor.reset();

    assert!(!state.dirty);
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(5.0)));
    assert!(editor.api().calls().is_empty());
}

// =============================================================================
// Saving
// =============================================================================

#[test]
fn test_save_sends_only_non_empty_rows_and_reloads() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor.set_cell(50, SAMPLE_DATE, "2023-06-15").unwrap();
    editor.set_cell(50, "PH", "7.4").unwrap();
    editor.api().clear_calls();

    let report = editor.save().unwrap();

    assert_eq!(report.rows_sent, 4);
    assert_eq!(report.page_number, 1);
    assert!(!editor.is_dirty());
    assert!(!editor.state().saving);

    let saved = editor.api().saved_pages();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].page_size, 100);
    assert_eq!(saved[0].page_number, 1);
    for row in &saved[0].data {
        assert_eq!(row[WATER_BODY], CellValue::Text(WATER.into()));
        assert!(!row.contains_key("id"));
    }
    assert_eq!(saved[0].data[3]["PH"], CellValue::Number(7.4));

    // Reload reflects the persisted state.
    assert!(
        editor
            .api()
            .calls()
            .iter()
            .any(|c| matches!(c, MockCall::GetPage { page_number: 1, .. }))
    );
    assert_eq!(editor.row(3).unwrap().get("PH"), Some(&CellValue::Number(7.4)));
}

#[test]
fn test_missing_date_blocks_save() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor.apply_edit(7, "TEMP", CellValue::Number(21.3)).unwrap();

    let err = editor.save().unwrap_err();
    match err {
        LenticrayError::Validation(v) => {
            assert_eq!(v, ValidationError::MissingDate { row: 8 });
            assert_eq!(v.column(), SAMPLE_DATE);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(save_calls(editor.api()), 0);
    assert!(editor.is_dirty());
    assert!(!editor.state().saving);
}

#[test]
fn test_non_numeric_value_blocks_save() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor
        .apply_edit(1, "PH", CellValue::Text("neutral".into()))
        .unwrap();

    let err = editor.save().unwrap_err();
    assert_eq!(err.to_string(), "Variable 'PH' in row 2 must be numeric.");
    assert_eq!(save_calls(editor.api()), 0);
}

#[test]
fn test_bad_date_blocks_save() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor.set_cell(0, SAMPLE_DATE, "15/06/2023").unwrap();

    let err = editor.save().unwrap_err();
    assert!(matches!(
        err,
        LenticrayError::Validation(ValidationError::InvalidDate { row: 1, .. })
    ));
    assert_eq!(save_calls(editor.api()), 0);
}

#[test]
fn test_empty_page_is_not_submitted() {
    let mut editor = open(api_with_rows(0), ScriptedGuard::new([]));
    let err = editor.save().unwrap_err();
    assert!(matches!(err, LenticrayError::EmptySubmission));
    assert_eq!(save_calls(editor.api()), 0);
}

#[test]
fn test_server_rejection_keeps_edits() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor.set_cell(0, "TEMP", "30").unwrap();
    editor.api().fail_next(400, "Cantidad de datos excede el tamaño de página");

    let err = editor.save().unwrap_err();
    assert!(matches!(err, LenticrayError::Server { status: 400, .. }));
    assert!(editor.is_dirty());
    assert!(!editor.state().saving);
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(30.0)));
}

#[test]
fn test_unedited_save_is_a_semantic_no_op() {
    let api = api_with_rows(3);
    let before = api.stored_rows(DATASET);
    let mut editor = open(api, ScriptedGuard::new([]));

    editor.save().unwrap();

    assert!(!editor.is_dirty());
    assert_eq!(editor.api().stored_rows(DATASET), before);
    assert!(editor.guard().asked().is_empty());
}

#[test]
fn test_save_reports_success_when_reload_fails() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor.set_cell(0, "TEMP", "30").unwrap();
    // The save goes through, the reload that follows does not.
    editor.api().fail_after(1, 503, "Service Unavailable");

    let report = editor.save().unwrap();

    assert!(!report.reloaded);
    assert_eq!(report.rows_sent, 3);
    assert!(!editor.is_dirty());
    assert!(!editor.is_stale());
    assert_eq!(editor.api().stored_rows(DATASET)[0]["TEMP"], CellValue::Number(30.0));
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(30.0)));
}

#[test]
fn test_save_reports_reload() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor.set_cell(1, "PH", "6.8").unwrap();
    assert!(editor.save().unwrap().reloaded);
}

// =============================================================================
// Navigation guard
// =============================================================================

#[test]
fn test_clean_buffer_navigates_without_asking() {
    let mut editor = open(api_with_rows(250), ScriptedGuard::new([]));
    assert_eq!(editor.total_pages(), 3);

    editor.next_page().unwrap();
    assert_eq!(editor.page_number(), 2);
    editor.last_page().unwrap();
    assert_eq!(editor.page_number(), 3);
    assert_eq!(editor.rows()[49].get("TEMP"), Some(&CellValue::Number(249.0)));
    assert!(editor.rows()[50].is_empty());

    assert!(editor.guard().asked().is_empty());
}

#[test]
fn test_out_of_range_pages() {
    let mut editor = open(api_with_rows(150), ScriptedGuard::new([]));
    assert!(matches!(
        editor.previous_page(),
        Err(LenticrayError::InvalidPage { page: 0, .. })
    ));
    assert!(matches!(
        editor.goto_page(3),
        Err(LenticrayError::InvalidPage { page: 3, total_pages: 2 })
    ));
}

#[test]
fn test_cancel_keeps_page_and_edits() {
    let mut editor = open(api_with_rows(150), ScriptedGuard::new([GuardDecision::Cancel]));
    editor.set_cell(0, "TEMP", "42").unwrap();

    let err = editor.next_page().unwrap_err();
    assert!(matches!(err, LenticrayError::Cancelled(_)));
    assert_eq!(editor.page_number(), 1);
    assert!(editor.is_dirty());
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(42.0)));
    assert_eq!(
        editor.guard().asked(),
        &[PendingAction::PageTurn { from: 1, to: 2 }]
    );
}

#[test]
fn test_discard_moves_without_saving() {
    let mut editor = open(api_with_rows(150), ScriptedGuard::new([GuardDecision::Discard]));
    editor.set_cell(0, "TEMP", "42").unwrap();

    editor.next_page().unwrap();

    assert_eq!(editor.page_number(), 2);
    assert!(!editor.is_dirty());
    assert_eq!(save_calls(editor.api()), 0);
    assert_eq!(editor.api().stored_rows(DATASET)[0]["TEMP"], CellValue::Number(0.0));
}

#[test]
fn test_save_decision_persists_before_moving() {
    let mut editor = open(api_with_rows(150), ScriptedGuard::new([GuardDecision::Save]));
    editor.set_cell(0, "TEMP", "42").unwrap();

    editor.goto_page(2).unwrap();

    assert_eq!(editor.page_number(), 2);
    assert!(!editor.is_dirty());
    let saved = editor.api().saved_pages();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].page_number, 1);
    assert_eq!(editor.api().stored_rows(DATASET)[0]["TEMP"], CellValue::Number(42.0));
}

#[test]
fn test_failed_save_decision_aborts_navigation() {
    let mut editor = open(api_with_rows(150), ScriptedGuard::new([GuardDecision::Save]));
    editor.apply_edit(0, SAMPLE_DATE, CellValue::Null).unwrap();

    let err = editor.next_page().unwrap_err();
    assert!(matches!(err, LenticrayError::Validation(_)));
    assert_eq!(editor.page_number(), 1);
    assert!(editor.is_dirty());
}

#[test]
fn test_failed_load_leaves_state_untouched() {
    let mut editor = open(api_with_rows(150), ScriptedGuard::new([GuardDecision::Discard]));
    editor.set_cell(4, "TEMP", "1.5").unwrap();
    editor.api().fail_next(503, "Service Unavailable");

    assert!(editor.next_page().is_err());
    assert_eq!(editor.page_number(), 1);
    assert!(editor.is_dirty());
    assert_eq!(editor.row(4).unwrap().get("TEMP"), Some(&CellValue::Number(1.5)));
}

#[test]
fn test_close_warning_tracks_dirty_state() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    assert!(!editor.should_warn_on_close());
    editor.set_cell(0, "PH", "7").unwrap();
    assert!(editor.should_warn_on_close());
    editor.save().unwrap();
    assert!(!editor.should_warn_on_close());
}

// =============================================================================
// Adding pages
// =============================================================================

#[test]
fn test_add_page_appends_blank_unsaved_page() {
    let mut editor = open(api_with_rows(350), ScriptedGuard::new([]));
    assert_eq!(editor.total_pages(), 4);
    editor.api().clear_calls();

    editor.add_page().unwrap();

    assert_eq!(editor.page_number(), 5);
    assert_eq!(editor.rows().len(), 100);
    assert!(editor.rows().iter().all(|r| r.is_empty()));
    assert!(!editor.is_dirty());
    assert!(editor.api().calls().is_empty());
}

#[test]
fn test_add_page_then_save_persists_new_rows() {
    let mut editor = open(api_with_rows(100), ScriptedGuard::new([]));
    editor.add_page().unwrap();
    assert_eq!(editor.page_number(), 2);

    editor.set_cell(0, SAMPLE_DATE, "2024-01-10").unwrap();
    editor.set_cell(0, "TEMP", "16.2").unwrap();
    editor.save().unwrap();

    assert_eq!(editor.total_pages(), 2);
    assert_eq!(editor.api().stored_rows(DATASET).len(), 101);
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(16.2)));
}

#[test]
fn test_add_page_after_guarded_save_recounts_pages() {
    let mut editor = open(api_with_rows(100), ScriptedGuard::new([GuardDecision::Save]));
    editor.add_page().unwrap();
    assert_eq!(editor.page_number(), 2);
    assert_eq!(editor.total_pages(), 1);

    editor.set_cell(0, SAMPLE_DATE, "2024-01-10").unwrap();
    editor.set_cell(0, "TEMP", "16.2").unwrap();
    editor.add_page().unwrap();

    // The saved page is counted before the next page number is chosen.
    assert_eq!(editor.api().stored_rows(DATASET).len(), 101);
    assert_eq!(editor.total_pages(), 2);
    assert_eq!(editor.page_number(), 3);
    assert!(editor.rows().iter().all(|r| r.is_empty()));
    assert!(!editor.is_dirty());
}

#[test]
fn test_add_page_is_guarded() {
    let mut editor = open(api_with_rows(100), ScriptedGuard::new([GuardDecision::Cancel]));
    editor.set_cell(0, "TEMP", "3").unwrap();

    assert!(matches!(editor.add_page(), Err(LenticrayError::Cancelled(_))));
    assert_eq!(editor.page_number(), 1);
    assert_eq!(editor.guard().asked(), &[PendingAction::AddPage]);
}

// =============================================================================
// CSV exchange
// =============================================================================

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

#[test]
fn test_upload_resets_to_first_page_and_reloads() {
    let mut editor = open(api_with_rows(250), ScriptedGuard::new([GuardDecision::Discard]));
    editor.last_page().unwrap();
    editor.set_cell(60, "TEMP", "9").unwrap();

    let file = csv_file("Sample Date,TEMP,PH\n2024-02-01,11.5,7.1\n2024-02-02,12.0,\n");
    let report = editor.upload_csv(file.path()).unwrap();

    assert_eq!(report.rows, 2);
    assert!(report.reloaded);
    assert!(report.hash.starts_with("sha256:"));
    assert!(!editor.is_dirty());
    assert_eq!(editor.page_number(), 1);
    assert_eq!(editor.total_pages(), 1);
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(11.5)));
    assert_eq!(editor.row(1).unwrap().get("PH"), Some(&CellValue::Null));
    assert!(editor.row(2).unwrap().is_empty());
    assert_eq!(editor.guard().asked(), &[PendingAction::UploadCsv]);
}

#[test]
fn test_upload_save_decision_persists_edits_first() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([GuardDecision::Save]));
    editor.set_cell(0, "TEMP", "42").unwrap();
    editor.api().clear_calls();

    let report = editor
        .upload_csv_bytes("lake.csv", b"Sample Date,TEMP,PH\n2024-02-01,1,2\n".to_vec())
        .unwrap();

    assert!(report.reloaded);
    let calls = editor.api().calls();
    let saved_at = calls
        .iter()
        .position(|c| matches!(c, MockCall::SavePage(_)))
        .expect("page saved");
    let uploaded_at = calls
        .iter()
        .position(|c| matches!(c, MockCall::UploadCsv { .. }))
        .expect("CSV uploaded");
    assert!(saved_at < uploaded_at);
    assert_eq!(editor.api().saved_pages()[0].data[0]["TEMP"], CellValue::Number(42.0));
    assert_eq!(editor.api().stored_rows(DATASET).len(), 1);
    assert_eq!(editor.guard().asked(), &[PendingAction::UploadCsv]);
}

#[test]
fn test_upload_with_failed_reload_blocks_stale_save() {
    let mut editor = open(api_with_rows(250), ScriptedGuard::new([GuardDecision::Discard]));
    editor.goto_page(3).unwrap();
    editor.set_cell(0, "TEMP", "9").unwrap();
    // The upload goes through, the reload of page 1 does not.
    editor.api().fail_after(1, 503, "Service Unavailable");

    let file = csv_file("Sample Date,TEMP,PH\n2024-02-01,11.5,7.1\n2024-02-02,12.0,\n");
    let report = editor.upload_csv(file.path()).unwrap();

    assert!(!report.reloaded);
    assert!(editor.is_stale());
    assert!(!editor.is_dirty());
    assert_eq!(editor.page_number(), 1);
    assert!(editor.rows().iter().all(|r| r.is_empty()));
    assert_eq!(editor.api().stored_rows(DATASET).len(), 2);

    // Nothing typed on the stale page may overwrite the uploaded rows.
    editor.set_cell(0, SAMPLE_DATE, "2024-03-01").unwrap();
    editor.set_cell(0, "TEMP", "5").unwrap();
    assert!(matches!(editor.save(), Err(LenticrayError::StalePage)));
    assert_eq!(save_calls(editor.api()), 0);
    assert_eq!(editor.api().stored_rows(DATASET).len(), 2);

    editor.refresh().unwrap();
    assert!(!editor.is_stale());
    assert_eq!(editor.total_pages(), 1);
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(11.5)));

    editor.set_cell(1, "PH", "7.3").unwrap();
    assert!(editor.save().unwrap().reloaded);
    assert_eq!(editor.api().stored_rows(DATASET).len(), 2);
    assert_eq!(editor.api().stored_rows(DATASET)[1]["PH"], CellValue::Number(7.3));
}

#[test]
fn test_upload_cancelled_by_guard_sends_nothing() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([GuardDecision::Cancel]));
    editor.set_cell(0, "TEMP", "9").unwrap();
    editor.api().clear_calls();

    let err = editor
        .upload_csv_bytes("lake.csv", b"Sample Date,TEMP,PH\n2024-02-01,1,2\n".to_vec())
        .unwrap_err();

    assert!(matches!(err, LenticrayError::Cancelled(_)));
    assert!(editor.api().calls().is_empty());
    assert!(editor.is_dirty());
}

#[test]
fn test_invalid_csv_is_rejected_locally() {
    let mut editor = open(api_with_rows(3), ScriptedGuard::new([]));
    editor.api().clear_calls();

    let err = editor
        .upload_csv_bytes("lake.csv", b"Date,TEMP\n2024-02-01,1\n".to_vec())
        .unwrap_err();

    assert!(matches!(err, LenticrayError::InvalidCsv(_)));
    assert!(editor.api().calls().is_empty());
    assert_eq!(editor.api().stored_rows(DATASET).len(), 3);
}

#[test]
fn test_server_rejected_upload_keeps_edits() {
    let mut editor = open(
        api_with_rows(3),
        ScriptedGuard::new([GuardDecision::Discard]),
    );
    editor.set_cell(0, "TEMP", "9").unwrap();
    editor.api().fail_next(400, "Error al leer el archivo CSV");

    let err = editor
        .upload_csv_bytes("lake.csv", b"Sample Date,TEMP,PH\n2024-02-01,1,2\n".to_vec())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Server rejected the request (400): Error al leer el archivo CSV"
    );
    assert!(editor.is_dirty());
    assert_eq!(editor.row(0).unwrap().get("TEMP"), Some(&CellValue::Number(9.0)));
}

#[test]
fn test_download_uses_server_filename() {
    let editor = DatasetEditor::open(
        api_with_rows(2),
        FixedGuard(GuardDecision::Cancel),
        DATASET,
    )
    .unwrap();

    let download = editor.download_csv().unwrap();
    assert_eq!(download.file_name, "tota_2023.csv");

    let text = String::from_utf8(download.bytes).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Sample Date,TEMP,PH"));
    assert_eq!(lines.next(), Some("2023-01-01,0,"));
}
