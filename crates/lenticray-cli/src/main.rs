//! Lenticray CLI - dataset grid editor for the Lenticray platform.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Context;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context {
        api_url: cli.api_url,
        session_path: cli.session,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Login { email, password } => commands::login::run(&ctx, email, password),

        Commands::Projects { json } => commands::projects::run(&ctx, json),

        Commands::Datasets { project, json } => commands::datasets::run(&ctx, project, json),

        Commands::Show {
            dataset,
            page,
            all_rows,
        } => commands::show::run(&ctx, dataset, page, all_rows),

        Commands::Edit {
            dataset,
            page,
            append,
            sets,
            yes,
        } => commands::edit::run(&ctx, dataset, page, append, sets, yes),

        Commands::Upload { dataset, file, yes } => {
            commands::upload::run(&ctx, dataset, file, yes)
        }

        Commands::Download { dataset, output } => commands::download::run(&ctx, dataset, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` means debug and the default is warn.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "lenticray=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
