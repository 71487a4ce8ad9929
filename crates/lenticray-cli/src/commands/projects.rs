//! Projects command - list the user's water bodies.

use colored::Colorize;
use lenticray::DatasetApi;

use super::Context;

pub fn run(ctx: &Context, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let api = ctx.connect()?;
    let projects = api.list_projects()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("{}", "No projects found.".yellow());
        return Ok(());
    }

    println!("{}", "Projects:".cyan().bold());
    for project in &projects {
        println!("  {}  {}", project.id.dimmed(), project.name.white().bold());
        if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
            println!("      {}", description);
        }
    }
    Ok(())
}
