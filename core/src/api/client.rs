// storefront_client/src/api/client.rs
use super::csrf::{CsrfGuard, CSRF_HEADER};
use super::retry::{with_backoff, RetryConfig};
use super::transport::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};
use crate::error::{StorefrontError, StorefrontResult};
use crate::store::SessionStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, instrument, warn};
use uuid::Uuid;

const FALLBACK_MESSAGE: &str = "Operation failed";

/// Where the client sends the user once the session is gone.
pub trait LoginRedirect: Send + Sync {
  fn redirect_to_login(&self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRedirect;

impl LoginRedirect for NoopRedirect {
  fn redirect_to_login(&self) {}
}

/// Pulls a human-readable message out of an error payload.
pub(crate) fn server_message(body: &Value) -> Option<String> {
  match body {
    Value::Object(map) => ["message", "error"]
      .iter()
      .find_map(|key| map.get(*key).and_then(Value::as_str))
      .map(str::to_string),
    Value::String(text) if !text.trim().is_empty() && !text.trim_start().starts_with('<') => {
      Some(text.trim().to_string())
    }
    _ => None,
  }
}

fn is_csrf_rejection(message: &str, body: &Value) -> bool {
  message.to_ascii_lowercase().contains("csrf")
    || body.get("code").and_then(Value::as_str) == Some("EBADCSRFTOKEN")
}

/// Maps a non-2xx response onto the error taxonomy.
pub(crate) fn classify_failure(path: &str, response: &ApiResponse) -> StorefrontError {
  let message = server_message(&response.body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
  match response.status {
    401 | 403 if is_csrf_rejection(&message, &response.body) => StorefrontError::Csrf { message },
    401 | 403 => StorefrontError::Auth {
      status: response.status,
      message,
    },
    404 => StorefrontError::NotFound(message),
    502..=504 => StorefrontError::TransientNetwork(format!("{} returned {}", path, response.status)),
    status => StorefrontError::Api { status, message },
  }
}

pub(crate) fn into_result(path: &str, outcome: Result<ApiResponse, TransportError>) -> StorefrontResult<Value> {
  match outcome {
    Err(e) => Err(StorefrontError::TransientNetwork(e.to_string())),
    Ok(response) if response.is_success() => Ok(response.body),
    Ok(response) => Err(classify_failure(path, &response)),
  }
}

/// HTTP client for the storefront backend: CSRF attach and refresh-once,
/// backoff for transient failures, session expiry on auth rejections.
#[derive(Clone)]
pub struct ResilientApiClient {
  transport: Arc<dyn HttpTransport>,
  session: SessionStore,
  csrf: CsrfGuard,
  retry: RetryConfig,
  redirect: Arc<dyn LoginRedirect>,
}

impl ResilientApiClient {
  pub fn new(
    transport: Arc<dyn HttpTransport>,
    session: SessionStore,
    retry: RetryConfig,
    redirect: Arc<dyn LoginRedirect>,
  ) -> Self {
    let csrf = CsrfGuard::new(transport.clone(), session.clone(), retry);
    Self {
      transport,
      session,
      csrf,
      retry,
      redirect,
    }
  }

  pub fn session(&self) -> &SessionStore {
    &self.session
  }

  pub fn csrf(&self) -> &CsrfGuard {
    &self.csrf
  }

  /// Forces a new CSRF token from the issuer and caches it.
  pub async fn fetch_csrf_token(&self) -> StorefrontResult<String> {
    self.csrf.refresh().await
  }

  /// Sends one JSON call through the full resilience stack and returns the
  /// response body of a 2xx answer.
  #[instrument(name = "ResilientApiClient::send", skip(self, body), fields(method = %method), err(Display))]
  pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> StorefrontResult<Value> {
    let result = self
      .csrf
      .with_refresh(|csrf_token| {
        let request = self.authorized_request(method.clone(), path, body.clone(), &csrf_token);
        async move { with_backoff(&self.retry, || self.dispatch(path, request.clone())).await }
      })
      .await;

    if let Err(StorefrontError::Auth { status, message }) = &result {
      self.expire_session(*status, message);
    }
    result
  }

  fn authorized_request(&self, method: Method, path: &str, body: Option<Value>, csrf_token: &str) -> ApiRequest {
    let mut request = ApiRequest::new(method, path)
      .header(CSRF_HEADER, csrf_token)
      .header("X-Request-Id", Uuid::new_v4().to_string());
    if let Some(token) = self.session.auth_token() {
      request = request.header("Authorization", format!("Bearer {}", token));
    }
    if let Some(body) = body {
      request = request.json(body);
    }
    request
  }

  async fn dispatch(&self, path: &str, request: ApiRequest) -> StorefrontResult<Value> {
    let outcome = self.transport.send(request).await;
    into_result(path, outcome)
  }

  pub(crate) fn expire_session(&self, status: u16, message: &str) {
    warn!(status, %message, "Session rejected by the server, clearing local auth state.");
    if let Err(e) = self.session.clear_auth() {
      error!(error = %e, "Failed to clear local auth state.");
    }
    self.redirect.redirect_to_login();
  }
}
