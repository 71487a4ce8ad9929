//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lenticray: edit water-quality datasets page by page
#[derive(Parser)]
#[command(name = "lenticray")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API root (default: $LENTICRAY_API_URL or the production endpoint)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Session file written by `login` ($LENTICRAY_TOKEN takes precedence)
    #[arg(long, global = true, default_value = ".lenticray/session.json")]
    pub session: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the access token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// List your projects (water bodies)
    Projects {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the datasets of a project
    Datasets {
        /// Project id
        #[arg(short, long)]
        project: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one page of a dataset
    Show {
        /// Dataset id
        #[arg(value_name = "DATASET")]
        dataset: String,

        /// Page to show (1-based)
        #[arg(short = 'n', long, default_value = "1")]
        page: usize,

        /// Also print the blank padding rows
        #[arg(long)]
        all_rows: bool,
    },

    /// Edit a page; without --set, starts an interactive session
    Edit {
        /// Dataset id
        #[arg(value_name = "DATASET")]
        dataset: String,

        /// Page to edit (1-based)
        #[arg(short = 'n', long, default_value = "1", conflicts_with = "append")]
        page: usize,

        /// Edit a new page after the last one
        #[arg(long)]
        append: bool,

        /// Cell assignment, e.g. `3:TEMP=12.5` or `3:Sample Date=2024-01-31`
        #[arg(long = "set", value_name = "ROW:COLUMN=VALUE")]
        sets: Vec<String>,

        /// Discard unsaved edits instead of asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Replace a dataset's rows with a CSV file
    Upload {
        /// Dataset id
        #[arg(value_name = "DATASET")]
        dataset: String,

        /// CSV file with `Sample Date` and one column per variable id
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Download a dataset as CSV
    Download {
        /// Dataset id
        #[arg(value_name = "DATASET")]
        dataset: String,

        /// Output file or directory (default: server-provided name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
