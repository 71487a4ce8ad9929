//! Client configuration and the authenticated session.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LenticrayError, Result};
use crate::model::DEFAULT_PAGE_SIZE;

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.lenticray.ice-ing.co/api/v1";

/// Configuration for API clients.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Versioned API root, without trailing slash.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Rows per page requested and submitted by the editor.
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(60),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by `LENTICRAY_API_URL` and `LENTICRAY_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LENTICRAY_API_URL") {
            config = config.with_base_url(url);
        }

        if let Ok(secs) = std::env::var("LENTICRAY_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                LenticrayError::Config(format!(
                    "LENTICRAY_TIMEOUT_SECS is not a number: {}",
                    secs
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Join an API path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Credentials injected into an API client.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// When the token was obtained.
    pub created_at: DateTime<Utc>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            created_at: Utc::now(),
        }
    }

    /// Create from the `LENTICRAY_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("LENTICRAY_TOKEN").map_err(|_| {
            LenticrayError::Config("LENTICRAY_TOKEN environment variable not set".to_string())
        })?;
        Ok(Self::new(token))
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Save the session to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LenticrayError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| LenticrayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a session from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LenticrayError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("created_at", &self.created_at)
            .finish()
    }
}
