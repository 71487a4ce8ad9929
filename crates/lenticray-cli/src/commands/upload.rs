//! Upload command - replace a dataset with a local CSV file.

use std::path::PathBuf;

use colored::Colorize;
use lenticray::{DatasetEditor, GuardDecision};

use super::{Context, PromptGuard, confirm};

pub fn run(
    ctx: &Context,
    dataset_id: String,
    file: PathBuf,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let api = ctx.connect()?;
    let guard = PromptGuard {
        assume: yes.then_some(GuardDecision::Discard),
    };
    let mut editor = DatasetEditor::open(api, guard, dataset_id)?;

    if !yes
        && !confirm(&format!(
            "Replace every row of '{}' with {}?",
            editor.dataset().name,
            file.display()
        ))
    {
        println!("{}", "Upload cancelled.".yellow());
        return Ok(());
    }

    let report = editor.upload_csv(&file)?;

    println!(
        "{} Uploaded {} to {}",
        "✓".green().bold(),
        report.file_name.white().bold(),
        editor.dataset().name
    );
    println!("  Rows sent:   {}", report.rows);
    println!("  Fingerprint: {}", report.hash.dimmed());
    if report.reloaded {
        println!("  Pages now:   {}", editor.total_pages());
    } else {
        println!(
            "{}",
            "  The upload succeeded but the dataset could not be reloaded.".yellow()
        );
    }
    Ok(())
}
