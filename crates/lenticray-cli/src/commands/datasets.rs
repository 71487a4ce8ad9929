//! Datasets command - list the datasets of one project.

use colored::Colorize;
use lenticray::DatasetApi;

use super::Context;

pub fn run(
    ctx: &Context,
    project_id: String,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = ctx.connect()?;
    let datasets = api.list_datasets(&project_id)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&datasets)?);
        return Ok(());
    }

    if datasets.is_empty() {
        println!("{}", "No datasets in this project.".yellow());
        return Ok(());
    }

    println!("{}", "Datasets:".cyan().bold());
    for dataset in &datasets {
        let rows = dataset
            .rows
            .map(|n| format!("{} rows", n))
            .unwrap_or_else(|| "rows unknown".to_string());
        println!(
            "  {}  {} ({}, {} variables)",
            dataset.id.dimmed(),
            dataset.name.white().bold(),
            rows,
            dataset.variables.len()
        );
    }
    Ok(())
}
