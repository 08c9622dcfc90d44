//! HTTP transport implementation.
//!
//! [`HttpTransport`] turns relative API paths into requests against the
//! server base URL and classifies the outcome. The actual HTTP client sits
//! behind [`HttpClient`] so tests can run without a network;
//! [`ReqwestClient`] is the production implementation.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::{Payload, RemoteAccess};
use parking_lot::RwLock;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// A raw HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// Why an HTTP exchange did not produce a response.
#[derive(Debug, Error)]
pub enum HttpFailure {
    /// The request timed out.
    #[error("request timed out")]
    Timeout,
    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Any other client-side failure.
    #[error("request failed: {0}")]
    Other(String),
}

/// HTTP client abstraction.
///
/// Implement this trait to provide the actual HTTP transport.
pub trait HttpClient: Send + Sync {
    /// Sends a GET request.
    fn get(&self, url: &str) -> Result<HttpResponse, HttpFailure>;

    /// Sends a form-encoded POST request.
    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<HttpResponse, HttpFailure>;

    /// Checks whether `url` answers at all.
    fn probe(&self, url: &str) -> bool {
        self.get(url).is_ok()
    }
}

/// Joins a base URL and a relative path with exactly one `/` between them.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Flattens a payload into form fields; non-string values are sent as JSON.
fn form_fields(payload: &Payload) -> Vec<(String, String)> {
    payload
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

/// HTTP-based remote access.
pub struct HttpTransport<C: HttpClient> {
    /// Base URL of the server (e.g., "https://central.example.com").
    base_url: String,
    /// HTTP client implementation.
    client: C,
    /// Last error message.
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a new HTTP transport.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the full URL for a relative path.
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Checks whether the server answers at its base URL.
    pub fn server_alive(&self) -> bool {
        self.client.probe(&self.base_url)
    }

    fn finish(&self, outcome: Result<HttpResponse, HttpFailure>) -> SyncResult<Value> {
        let result = outcome.map_err(classify).and_then(decode);
        match &result {
            Ok(_) => *self.last_error.write() = None,
            Err(e) => *self.last_error.write() = Some(e.to_string()),
        }
        result
    }
}

fn classify(failure: HttpFailure) -> SyncError {
    match failure {
        HttpFailure::Timeout => SyncError::Timeout,
        HttpFailure::Connect(message) => SyncError::transport_retryable(message),
        HttpFailure::Other(message) => SyncError::transport_fatal(message),
    }
}

fn decode(response: HttpResponse) -> SyncResult<Value> {
    if response.status != 200 {
        return Err(SyncError::Status(response.status));
    }
    serde_json::from_slice(&response.body)
        .map_err(|e| SyncError::Protocol(format!("failed to decode response: {e}")))
}

impl<C: HttpClient> RemoteAccess for HttpTransport<C> {
    fn get(&self, path: &str) -> SyncResult<Value> {
        let url = self.url_for(path);
        trace!(%url, "GET");
        self.finish(self.client.get(&url))
    }

    fn post(&self, path: &str, payload: &Payload) -> SyncResult<Value> {
        let url = self.url_for(path);
        trace!(%url, "POST");
        self.finish(self.client.post_form(&url, &form_fields(payload)))
    }
}

impl HttpTransport<ReqwestClient> {
    /// Creates a transport backed by [`ReqwestClient`].
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Ok(Self::new(
            config.server_url.clone(),
            ReqwestClient::new(config)?,
        ))
    }
}

/// Blocking HTTP client built on `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    probe_timeout: Duration,
}

impl ReqwestClient {
    /// Creates a client with the configured timeout and API key header.
    ///
    /// # Errors
    ///
    /// Fails if the API key is not a valid header value or the client cannot
    /// be built.
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Api-Key {key}"))
                .map_err(|e| SyncError::transport_fatal(format!("invalid API key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::transport_fatal(e.to_string()))?;

        Ok(Self {
            client,
            probe_timeout: config.probe_timeout,
        })
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpResponse, HttpFailure> {
        let status = response.status().as_u16();
        let body = response.bytes().map_err(failure_of)?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

fn failure_of(err: reqwest::Error) -> HttpFailure {
    if err.is_timeout() {
        HttpFailure::Timeout
    } else if err.is_connect() {
        HttpFailure::Connect(err.to_string())
    } else {
        HttpFailure::Other(err.to_string())
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpFailure> {
        let response = self.client.get(url).send().map_err(failure_of)?;
        Self::read(response)
    }

    fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<HttpResponse, HttpFailure> {
        let response = self.client.post(url).form(form).send().map_err(failure_of)?;
        Self::read(response)
    }

    fn probe(&self, url: &str) -> bool {
        self.client
            .get(url)
            .timeout(self.probe_timeout)
            .send()
            .is_ok()
    }
}
