//! Blocking HTTP implementation of [`DatasetApi`].

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{LenticrayError, Result};
use crate::exchange::{CsvDownload, CsvUpload};
use crate::model::{Dataset, Project};

use super::client::{DataPage, DatasetApi, PageUpdate};
use super::config::{ApiConfig, Session};

/// Lenticray REST client authenticated with an explicit [`Session`].
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
    session: Session,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

impl HttpApi {
    /// Create a client for the given configuration and session.
    pub fn new(config: ApiConfig, session: Session) -> Result<Self> {
        Ok(Self {
            client: build_client(&config)?,
            config,
            session,
        })
    }

    /// Exchange credentials for a session (`POST /users/login`).
    pub fn login(config: &ApiConfig, email: &str, password: &str) -> Result<Session> {
        let client = build_client(config)?;
        let url = config.url("/users/login");
        debug!(%url, "logging in");

        let request = client
            .post(&url)
            .json(&json!({ "email": email, "password": password }));
        let response = send(request, &url)?;
        let token: TokenResponse = decode(response, &url)?;

        let mut session = Session::new(token.access_token);
        if let Some(kind) = token.token_type {
            session.token_type = kind;
        }
        Ok(session)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.session.authorization())
                .map_err(|e| LenticrayError::Config(format!("Invalid access token: {}", e)))?,
        );
        Ok(headers)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.config.url(path);
        debug!(%url, ?query, "GET");
        let request = self
            .client
            .get(&url)
            .headers(self.build_headers()?)
            .query(query);
        decode(send(request, &url)?, &url)
    }
}

impl DatasetApi for HttpApi {
    fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_json("/projects/", &[])
    }

    fn list_datasets(&self, project_id: &str) -> Result<Vec<Dataset>> {
        self.get_json("/datasets/", &[("project_id", project_id.to_string())])
    }

    fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        self.get_json(&format!("/datasets/{}", dataset_id), &[])
    }

    fn get_project(&self, project_id: &str) -> Result<Project> {
        self.get_json(&format!("/projects/{}", project_id), &[])
    }

    fn get_page(
        &self,
        dataset_id: &str,
        page_size: usize,
        page_number: usize,
    ) -> Result<DataPage> {
        self.get_json(
            &format!("/datasets/{}/data", dataset_id),
            &[
                ("page_size", page_size.to_string()),
                ("page_number", page_number.to_string()),
            ],
        )
    }

    fn save_page(&self, dataset_id: &str, update: &PageUpdate) -> Result<()> {
        let url = self.config.url(&format!("/datasets/{}/data", dataset_id));
        debug!(%url, page = update.page_number, rows = update.data.len(), "PUT");
        let request = self
            .client
            .put(&url)
            .headers(self.build_headers()?)
            .json(update);
        send(request, &url)?;
        Ok(())
    }

    fn upload_csv(&self, dataset_id: &str, upload: &CsvUpload) -> Result<()> {
        let url = self.config.url(&format!("/datasets/{}/upload_csv", dataset_id));
        debug!(%url, file = %upload.file_name, bytes = upload.bytes.len(), "POST multipart");

        let part = multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str("text/csv")
            .map_err(|e| LenticrayError::Transport {
                url: url.clone(),
                source: e,
            })?;
        let form = multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .multipart(form);
        send(request, &url)?;
        Ok(())
    }

    fn download_csv(&self, dataset_id: &str) -> Result<CsvDownload> {
        let url = self.config.url(&format!("/datasets/{}/download_csv", dataset_id));
        debug!(%url, "GET binary");
        let request = self.client.get(&url).headers(self.build_headers()?);
        let response = send(request, &url)?;

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .map_err(|e| LenticrayError::Transport {
                url: url.clone(),
                source: e,
            })?
            .to_vec();

        Ok(CsvDownload::new(disposition.as_deref(), bytes))
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn build_client(config: &ApiConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| LenticrayError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Send a request, turning non-success statuses into [`LenticrayError::Server`].
fn send(request: RequestBuilder, url: &str) -> Result<Response> {
    let response = request.send().map_err(|e| LenticrayError::Transport {
        url: url.to_string(),
        source: e,
    })?;

    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().unwrap_or_default();
    Err(server_error(status, &body))
}

fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
    response.json().map_err(|e| LenticrayError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Build a server error, preferring the API's `detail` message.
pub(crate) fn server_error(status: StatusCode, body: &str) -> LenticrayError {
    let message = detail_message(body)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('<')).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    LenticrayError::Server {
        status: status.as_u16(),
        message,
    }
}

/// `{"detail": "..."}` or a list of `{"msg": ...}` validation entries.
fn detail_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        other => Some(other.to_string()),
    }
}
