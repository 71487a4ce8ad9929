//! Edit command - change cells on one page and save them.
//!
//! With `--set` the assignments are applied and the page is saved in one go.
//! Without it an interactive session reads commands from stdin.

use std::path::PathBuf;

use colored::Colorize;
use lenticray::{DatasetApi, DatasetEditor, GuardDecision, LenticrayError, NavigationGuard};

use super::show::print_page;
use super::{Context, PromptGuard, confirm, read_line};

/// One `ROW:COLUMN=VALUE` assignment; `row` is 1-based as displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub row: usize,
    pub column: String,
    pub value: String,
}

impl std::str::FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected ROW:COLUMN=VALUE, got '{}'", s))?;
        let (column, value) = rest
            .split_once('=')
            .ok_or_else(|| format!("Expected ROW:COLUMN=VALUE, got '{}'", s))?;
        let row: usize = row
            .trim()
            .parse()
            .map_err(|_| format!("Row must be a positive number, got '{}'", row.trim()))?;
        if row == 0 {
            return Err("Rows are numbered from 1".to_string());
        }
        let column = column.trim();
        if column.is_empty() {
            return Err(format!("Missing column in '{}'", s));
        }

        Ok(Assignment {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}

pub fn run(
    ctx: &Context,
    dataset_id: String,
    page: usize,
    append: bool,
    sets: Vec<String>,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let assignments = sets
        .iter()
        .map(|s| s.parse::<Assignment>())
        .collect::<Result<Vec<_>, _>>()?;

    let api = ctx.connect()?;
    let page_size = api.config().page_size;
    let guard = PromptGuard {
        assume: yes.then_some(GuardDecision::Discard),
    };
    let mut editor = DatasetEditor::open_at(api, guard, dataset_id, page, page_size)?;
    if append {
        editor.add_page()?;
    }

    if assignments.is_empty() {
        return interactive(&mut editor);
    }

    for assignment in &assignments {
        apply(&mut editor, assignment)?;
    }
    let report = editor.save()?;
    println!(
        "{} Saved {} rows on page {}",
        "✓".green().bold(),
        report.rows_sent.to_string().white().bold(),
        report.page_number
    );
    if !report.reloaded {
        println!("{}", RELOAD_FAILED.yellow());
    }
    Ok(())
}

/// Apply an assignment with the same input rules as the grid.
fn apply<A: DatasetApi, G: NavigationGuard>(
    editor: &mut DatasetEditor<A, G>,
    assignment: &Assignment,
) -> Result<(), Box<dyn std::error::Error>> {
    let column = resolve_column(editor, &assignment.column)?;
    let mut cell = editor.begin_edit(assignment.row - 1, &column)?;
    if !cell.input(&assignment.value) {
        return Err(format!(
            "'{}' is not accepted in column {}",
            assignment.value, column
        )
        .into());
    }
    let outcome = cell.blur().map_err(|source| LenticrayError::Cell {
        column: column.clone(),
        source,
    })?;
    editor.finish_edit(outcome)?;
    Ok(())
}

/// Match a column key exactly, then case-insensitively.
fn resolve_column<A: DatasetApi, G: NavigationGuard>(
    editor: &DatasetEditor<A, G>,
    name: &str,
) -> Result<String, LenticrayError> {
    let columns = editor.columns();
    columns
        .iter()
        .find(|c| c.key == name)
        .or_else(|| columns.iter().find(|c| c.key.eq_ignore_ascii_case(name)))
        .map(|c| c.key.clone())
        .ok_or_else(|| LenticrayError::UnknownColumn(name.to_string()))
}

/// A line typed in the interactive session.
#[derive(Debug, Clone, PartialEq)]
enum SessionCommand {
    Set(Assignment),
    Show { all_rows: bool },
    Page(usize),
    Next,
    Previous,
    First,
    Last,
    Add,
    Save,
    Reset,
    Reload,
    Upload(PathBuf),
    Download(Option<PathBuf>),
    Help,
    Quit,
}

impl std::str::FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match word.to_lowercase().as_str() {
            "set" => rest.parse().map(SessionCommand::Set),
            "show" => Ok(SessionCommand::Show {
                all_rows: rest == "all",
            }),
            "page" => rest
                .parse()
                .map(SessionCommand::Page)
                .map_err(|_| format!("Expected a page number, got '{}'", rest)),
            "next" | "n" => Ok(SessionCommand::Next),
            "prev" | "p" => Ok(SessionCommand::Previous),
            "first" => Ok(SessionCommand::First),
            "last" => Ok(SessionCommand::Last),
            "add" => Ok(SessionCommand::Add),
            "save" => Ok(SessionCommand::Save),
            "reset" => Ok(SessionCommand::Reset),
            "reload" => Ok(SessionCommand::Reload),
            "upload" if !rest.is_empty() => Ok(SessionCommand::Upload(PathBuf::from(rest))),
            "upload" => Err("Usage: upload FILE".to_string()),
            "download" => Ok(SessionCommand::Download(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            _ => Err(format!("Unknown command '{}' (try 'help')", word)),
        }
    }
}

const RELOAD_FAILED: &str = "  Saved on the server, but the page could not be reloaded.";

const HELP: &str = "\
  set ROW:COLUMN=VALUE   change a cell (e.g. set 3:TEMP=12.5)
  show [all]             print the page (all: include blank rows)
  page N | next | prev | first | last
  add                    start a new page after the last one
  save                   validate and save this page
  reset                  mark the page as saved without sending it
  reload                 fetch the page again, dropping edits
  upload FILE            replace the dataset with a CSV file
  download [PATH]        write the dataset as CSV
  quit";

fn interactive<A: DatasetApi, G: NavigationGuard>(
    editor: &mut DatasetEditor<A, G>,
) -> Result<(), Box<dyn std::error::Error>> {
    print_page(editor, false);
    println!("{}", "Type 'help' for commands.".dimmed());

    loop {
        let prompt = format!(
            "{}{}> ",
            editor.page_number(),
            if editor.is_dirty() { "*" } else { "" }
        );
        let Some(line) = read_line(&prompt) else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.red());
                continue;
            }
        };

        if command == SessionCommand::Quit {
            if editor.should_warn_on_close() && !confirm("You have unsaved changes. Quit anyway?")
            {
                continue;
            }
            break;
        }

        if let Err(e) = execute(editor, command) {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
    }
    Ok(())
}

fn execute<A: DatasetApi, G: NavigationGuard>(
    editor: &mut DatasetEditor<A, G>,
    command: SessionCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        SessionCommand::Set(assignment) => apply(editor, &assignment)?,
        SessionCommand::Show { all_rows } => print_page(editor, all_rows),
        SessionCommand::Page(n) => {
            editor.goto_page(n)?;
            print_page(editor, false);
        }
        SessionCommand::Next => {
            editor.next_page()?;
            print_page(editor, false);
        }
        SessionCommand::Previous => {
            editor.previous_page()?;
            print_page(editor, false);
        }
        SessionCommand::First => {
            editor.first_page()?;
            print_page(editor, false);
        }
        SessionCommand::Last => {
            editor.last_page()?;
            print_page(editor, false);
        }
        SessionCommand::Add => {
            editor.add_page()?;
            println!("Started page {}", editor.page_number());
        }
        SessionCommand::Save => {
            let report = editor.save()?;
            println!(
                "{} Saved {} rows on page {}",
                "✓".green().bold(),
                report.rows_sent,
                report.page_number
            );
            if !report.reloaded {
                println!("{} (try 'reload')", RELOAD_FAILED.yellow());
            }
        }
        SessionCommand::Reset => {
            editor.reset();
        }
        SessionCommand::Reload => {
            editor.refresh()?;
            print_page(editor, false);
        }
        SessionCommand::Upload(path) => {
            let report = editor.upload_csv(&path)?;
            println!(
                "{} Uploaded {} ({} rows)",
                "✓".green().bold(),
                report.file_name,
                report.rows
            );
            if report.reloaded {
                print_page(editor, false);
            } else {
                println!("{} (try 'reload')", RELOAD_FAILED.yellow());
            }
        }
        SessionCommand::Download(target) => {
            let download = editor.download_csv()?;
            let written = download.write_to(target.unwrap_or_else(|| PathBuf::from(".")))?;
            println!("{} Wrote {}", "✓".green().bold(), written.display());
        }
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Quit => {}
    }
    Ok(())
}
