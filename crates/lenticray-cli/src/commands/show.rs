//! Show command - print one page of a dataset as a grid.

use colored::Colorize;
use lenticray::{
    ColumnKind, DatasetApi, DatasetEditor, FixedGuard, GuardDecision, NavigationGuard,
};

use super::Context;

pub fn run(
    ctx: &Context,
    dataset_id: String,
    page: usize,
    all_rows: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = ctx.connect()?;
    let page_size = api.config().page_size;
    let editor = DatasetEditor::open_at(
        api,
        FixedGuard(GuardDecision::Cancel),
        dataset_id,
        page,
        page_size,
    )?;

    print_page(&editor, all_rows);
    Ok(())
}

/// Print the resident page. Blank rows are skipped unless `all_rows`.
pub fn print_page<A: DatasetApi, G: NavigationGuard>(
    editor: &DatasetEditor<A, G>,
    all_rows: bool,
) {
    println!(
        "{} {} ({})",
        "Dataset".cyan().bold(),
        editor.dataset().name.white().bold(),
        editor.water_body()
    );
    println!(
        "Page {}/{}{}",
        editor.page_number().to_string().white().bold(),
        editor.total_pages(),
        if editor.is_stale() {
            " (out of date, reload before editing)".yellow().to_string()
        } else if editor.page_number() > editor.total_pages() {
            " (new, unsaved)".yellow().to_string()
        } else {
            String::new()
        }
    );
    println!();

    let columns = editor.columns();
    let rows: Vec<_> = editor
        .rows()
        .iter()
        .filter(|row| all_rows || !row.is_empty())
        .collect();

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| row.display(&c.key)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.key.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.key, w = *w))
        .collect();
    println!("{:>5}  {}", "#".dimmed(), header.join("  ").bold());

    for (row, values) in rows.iter().zip(&cells) {
        let line: Vec<String> = values
            .iter()
            .zip(columns)
            .zip(&widths)
            .map(|((value, column), w)| {
                let padded = format!("{:<w$}", value, w = *w);
                match column.kind {
                    ColumnKind::Display => padded.dimmed().to_string(),
                    _ => padded,
                }
            })
            .collect();
        println!("{:>5}  {}", row.id + 1, line.join("  "));
    }

    if rows.is_empty() {
        println!("{}", "  (no data on this page)".dimmed());
    }

    println!();
    for column in columns.iter().filter(|c| c.kind == ColumnKind::Numeric) {
        println!("  {} {}", column.key.dimmed(), column.label);
    }
}
