//! Lenticray REST API access.
//!
//! The editor talks to the API only through the [`DatasetApi`] trait, so the
//! same session logic runs against the real service ([`HttpApi`]) or an
//! in-memory fake ([`MockApi`]).
//!
//! # Example
//!
//! ```no_run
//! use lenticray::{ApiConfig, DatasetApi, HttpApi, Session};
//!
//! let config = ApiConfig::from_env().unwrap();
//! let session = HttpApi::login(&config, "analyst@example.org", "secret").unwrap();
//! let api = HttpApi::new(config, session).unwrap();
//!
//! for project in api.list_projects().unwrap() {
//!     println!("{} {}", project.id, project.name);
//! }
//! ```

mod client;
mod config;
mod http;
mod mock;

pub use client::{DataPage, DatasetApi, PageUpdate};
pub use config::{ApiConfig, DEFAULT_API_URL, Session};
pub use http::HttpApi;
pub use mock::{MockApi, MockCall};
