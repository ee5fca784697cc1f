// storefront_client/src/api/transport.rs

//! The raw HTTP seam. Everything above this trait is transport-agnostic.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{event, Level};

pub use reqwest::Method;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
  pub method: Method,
  /// Path relative to the API base, e.g. `/api/orders`.
  pub path: String,
  pub query: Vec<(String, String)>,
  pub headers: Vec<(String, String)>,
  pub body: Option<Value>,
}

impl ApiRequest {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: Vec::new(),
      headers: Vec::new(),
      body: None,
    }
  }

  pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
    self.headers.push((name.to_string(), value.into()));
    self
  }

  pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
    self.query.push((name.to_string(), value.into()));
    self
  }

  pub fn json(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  pub fn header_value(&self, name: &str) -> Option<&str> {
    self
      .headers
      .iter()
      .find(|(k, _)| k.eq_ignore_ascii_case(name))
      .map(|(_, v)| v.as_str())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
  pub status: u16,
  /// Parsed JSON body. Empty bodies become `Null`, non-JSON bodies a `String`.
  pub body: Value,
}

impl ApiResponse {
  pub fn new(status: u16, body: Value) -> Self {
    Self { status, body }
  }

  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Failures below HTTP: the request never produced a status code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
  #[error("request timed out")]
  Timeout,
  #[error("connection failed: {0}")]
  Connect(String),
  #[error("transport error: {0}")]
  Other(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
  if err.is_timeout() {
    TransportError::Timeout
  } else if err.is_connect() {
    TransportError::Connect(err.to_string())
  } else {
    TransportError::Other(err.to_string())
  }
}

pub(crate) fn parse_body(raw: &str) -> Value {
  if raw.trim().is_empty() {
    return Value::Null;
  }
  serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// `HttpTransport` over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
  client: reqwest::Client,
  base_url: String,
}

impl ReqwestTransport {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(map_reqwest_error)?;
    Ok(Self::with_client(client, base_url))
  }

  pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
    Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn client(&self) -> &reqwest::Client {
    &self.client
  }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
    let url = format!("{}{}", self.base_url, request.path);
    let mut builder = self.client.request(request.method.clone(), &url);
    if !request.query.is_empty() {
      builder = builder.query(&request.query);
    }
    for (name, value) in &request.headers {
      builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await.map_err(map_reqwest_error)?;
    let status = response.status().as_u16();
    let raw = response.text().await.map_err(map_reqwest_error)?;
    event!(Level::TRACE, %url, status, "HTTP response received.");
    Ok(ApiResponse::new(status, parse_body(&raw)))
  }
}
