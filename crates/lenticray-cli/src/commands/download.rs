//! Download command - save a dataset as CSV.

use std::path::PathBuf;

use colored::Colorize;
use lenticray::DatasetApi;

use super::Context;

pub fn run(
    ctx: &Context,
    dataset_id: String,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = ctx.connect()?;
    let download = api.download_csv(&dataset_id)?;

    let target = output.unwrap_or_else(|| PathBuf::from("."));
    let written = download.write_to(&target)?;

    println!(
        "{} Wrote {} ({} bytes)",
        "✓".green().bold(),
        written.display().to_string().white().bold(),
        download.bytes.len()
    );
    Ok(())
}
