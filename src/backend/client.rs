//! Typed calls against the analysis backend.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::multipart;
use crate::config::BackendSettings;
use crate::http;
use crate::workflow::{AnalysisMode, DatasetSummary};

/// Failures surfaced by backend calls.
///
/// `Rejected` carries the backend's own human-readable message and is shown
/// to the user as-is; the other variants are wrapped with local context.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL does not parse.
    #[error("Backend base URL is invalid: {0}")]
    BadBaseUrl(String),
    /// The backend answered with a non-2xx status.
    #[error("{0}")]
    Rejected(String),
    /// The request never completed (connection, TLS, timeout, oversized body).
    #[error("Network error: {0}")]
    Transport(String),
    /// The response arrived but could not be understood.
    #[error("Invalid response from backend: {0}")]
    Decode(String),
}

/// Client for the upload/process endpoints and plot images.
#[derive(Debug)]
pub struct BackendClient {
    agent: ureq::Agent,
    base_url: Url,
    max_body_bytes: usize,
}

impl BackendClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::BadBaseUrl(format!("{}: {err}", settings.base_url)))?;
        Ok(Self {
            agent: http::build_agent(Duration::from_secs(settings.read_timeout_secs)),
            base_url,
            max_body_bytes: settings.max_body_bytes,
        })
    }

    /// Submit a CSV as multipart `POST /upload` and parse the summary.
    pub fn upload_dataset(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<DatasetSummary, ApiError> {
        let (content_type, body) = multipart::file_form("file", file_name, "text/csv", bytes);
        let result = self
            .agent
            .post(self.endpoint("upload")?.as_str())
            .set("Content-Type", &content_type)
            .send_bytes(&body);
        let body = self.success_body(result)?;
        DatasetSummary::from_upload_json(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Kick off an analysis run via `POST /process`.
    ///
    /// Returns the raw result payload; interpretation into report sections is
    /// the caller's concern.
    pub fn run_analysis(
        &self,
        filename: &str,
        target: &str,
        mode: AnalysisMode,
    ) -> Result<Value, ApiError> {
        let payload = serde_json::json!({
            "filename": filename,
            "target": target,
            "mode": mode.wire_name(),
        });
        let result = self
            .agent
            .post(self.endpoint("process")?.as_str())
            .set("Content-Type", "application/json")
            .send_string(&payload.to_string());
        let body = self.success_body(result)?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Fetch a plot image by its (possibly relative) URL.
    pub fn fetch_plot(&self, raw_url: &str) -> Result<Vec<u8>, ApiError> {
        let url = self
            .resolve_image_url(raw_url)
            .ok_or_else(|| ApiError::Decode(format!("Unusable plot URL '{raw_url}'")))?;
        self.success_body(self.agent.get(&url).call())
    }

    /// Resolve an image reference against the backend origin.
    ///
    /// Absolute `http(s)` URLs pass through; anything else is joined onto the
    /// configured base. Empty references resolve to nothing.
    pub fn resolve_image_url(&self, raw: &str) -> Option<String> {
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Some(raw.to_string());
        }
        self.base_url.join(raw).ok().map(String::from)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::BadBaseUrl(format!("{path}: {err}")))
    }

    fn success_body(
        &self,
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<Vec<u8>, ApiError> {
        match result {
            Ok(response) => http::read_body_bytes(response, self.max_body_bytes)
                .map_err(|err| ApiError::Transport(err.to_string())),
            Err(ureq::Error::Status(code, response)) => Err(ApiError::Rejected(
                failure_detail(code, response, self.max_body_bytes),
            )),
            Err(err) => Err(ApiError::Transport(err.to_string())),
        }
    }
}

/// Best human-readable message for a non-2xx response: the body's `detail`
/// string when present, the JSON body itself otherwise, the status as a last
/// resort.
fn failure_detail(code: u16, response: ureq::Response, max_body_bytes: usize) -> String {
    let bytes = http::read_body_bytes(response, max_body_bytes).unwrap_or_default();
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(body) => body
            .get("detail")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => format!("HTTP {code}"),
    }
}
