//! CLI command implementations.

pub mod datasets;
pub mod download;
pub mod edit;
pub mod login;
pub mod projects;
pub mod show;
pub mod upload;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use lenticray::{ApiConfig, GuardDecision, HttpApi, NavigationGuard, PendingAction, Session};
use tracing::debug;

/// Options shared by every command.
pub struct Context {
    pub api_url: Option<String>,
    pub session_path: PathBuf,
    pub verbose: bool,
}

impl Context {
    pub fn config(&self) -> Result<ApiConfig, Box<dyn std::error::Error>> {
        let config = ApiConfig::from_env()?;
        Ok(match &self.api_url {
            Some(url) => config.with_base_url(url.as_str()),
            None => config,
        })
    }

    /// An authenticated client, from `$LENTICRAY_TOKEN` or the session file.
    pub fn connect(&self) -> Result<HttpApi, Box<dyn std::error::Error>> {
        let session = match Session::from_env() {
            Ok(session) => session,
            Err(_) => {
                if !self.session_path.exists() {
                    return Err(format!(
                        "Not logged in: {} not found\nRun 'lenticray login' first.",
                        self.session_path.display()
                    )
                    .into());
                }
                debug!(path = %self.session_path.display(), "loading session");
                Session::load(&self.session_path)?
            }
        };
        Ok(HttpApi::new(self.config()?, session)?)
    }
}

/// Asks on the terminal what to do with unsaved edits.
pub struct PromptGuard {
    /// Answer given without asking.
    pub assume: Option<GuardDecision>,
}

impl NavigationGuard for PromptGuard {
    fn decide(&mut self, action: &PendingAction) -> GuardDecision {
        if let Some(decision) = self.assume {
            return decision;
        }

        println!("{}", action.prompt().yellow());
        loop {
            match ask("[s]ave / [d]iscard / [c]ancel: ").as_deref() {
                Some("s") | Some("save") => return GuardDecision::Save,
                Some("d") | Some("discard") => return GuardDecision::Discard,
                Some("c") | Some("cancel") | None => return GuardDecision::Cancel,
                Some(_) => continue,
            }
        }
    }
}

/// Print `prompt` and read one trimmed line, case preserved. `None` on EOF.
pub fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Like [`read_line`], lowercased for matching answers.
pub fn ask(question: &str) -> Option<String> {
    read_line(question).map(|answer| answer.to_lowercase())
}

/// Yes/no question defaulting to no.
pub fn confirm(question: &str) -> bool {
    matches!(
        ask(&format!("{} [y/N]: ", question)).as_deref(),
        Some("y") | Some("yes")
    )
}
