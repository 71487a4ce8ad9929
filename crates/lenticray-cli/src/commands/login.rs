//! Login command - exchange credentials for a stored session.

use colored::Colorize;
use lenticray::HttpApi;

use super::Context;

pub fn run(
    ctx: &Context,
    email: String,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ctx.config()?;
    if ctx.verbose {
        println!("{} {}", "Logging in at".cyan(), config.base_url.white());
    }

    let session = HttpApi::login(&config, &email, &password)?;
    session.save(&ctx.session_path)?;

    println!(
        "{} Logged in as {}",
        "✓".green().bold(),
        email.white().bold()
    );
    println!("  Session: {}", ctx.session_path.display());
    Ok(())
}
