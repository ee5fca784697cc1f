// storefront_client/src/api/csrf.rs

//! CSRF token cache and the refresh-and-retry-once policy.

use super::client::into_result;
use super::retry::{with_backoff, RetryConfig};
use super::transport::{ApiRequest, HttpTransport, Method};
use crate::error::{StorefrontError, StorefrontResult};
use crate::store::SessionStore;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const CSRF_TOKEN_PATH: &str = "/api/csrf-token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsrfTokenResponse {
  csrf_token: Option<String>,
}

#[derive(Clone)]
pub struct CsrfGuard {
  transport: Arc<dyn HttpTransport>,
  session: SessionStore,
  retry: RetryConfig,
}

impl CsrfGuard {
  pub fn new(transport: Arc<dyn HttpTransport>, session: SessionStore, retry: RetryConfig) -> Self {
    Self {
      transport,
      session,
      retry,
    }
  }

  /// The cached token, or a freshly issued one.
  pub async fn token(&self) -> StorefrontResult<String> {
    match self.session.csrf_token() {
      Some(token) => Ok(token),
      None => self.fetch().await,
    }
  }

  /// Drops the cached token and asks the issuer for a new one.
  pub async fn refresh(&self) -> StorefrontResult<String> {
    self.session.clear_csrf_token()?;
    self.fetch().await
  }

  #[instrument(name = "CsrfGuard::fetch", skip(self), err(Display))]
  async fn fetch(&self) -> StorefrontResult<String> {
    let mut request = ApiRequest::new(Method::GET, CSRF_TOKEN_PATH);
    if let Some(token) = self.session.auth_token() {
      request = request.header("Authorization", format!("Bearer {}", token));
    }
    let body = with_backoff(&self.retry, || {
      let request = request.clone();
      async move {
        let outcome = self.transport.send(request).await;
        into_result(CSRF_TOKEN_PATH, outcome)
      }
    })
    .await?;

    let parsed: CsrfTokenResponse =
      serde_json::from_value(body).map_err(|e| StorefrontError::MalformedResponse {
        endpoint: CSRF_TOKEN_PATH.to_string(),
        message: e.to_string(),
      })?;
    let token = parsed
      .csrf_token
      .filter(|t| !t.is_empty())
      .ok_or_else(|| StorefrontError::MalformedResponse {
        endpoint: CSRF_TOKEN_PATH.to_string(),
        message: "missing csrfToken".to_string(),
      })?;
    self.session.set_csrf_token(&token)?;
    debug!("CSRF token cached.");
    Ok(token)
  }

  /// Runs `operation` with a CSRF token. If the server rejects the token, one
  /// fresh token is fetched and the operation runs exactly once more; a second
  /// rejection is returned as is.
  pub async fn with_refresh<F, Fut, T>(&self, mut operation: F) -> StorefrontResult<T>
  where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StorefrontResult<T>>,
  {
    let token = self.token().await?;
    match operation(token).await {
      Err(StorefrontError::Csrf { message }) => {
        warn!(%message, "CSRF token rejected, refreshing and retrying once.");
        let fresh = self.refresh().await?;
        let second = operation(fresh).await;
        if let Err(StorefrontError::Csrf { message }) = &second {
          warn!(%message, "CSRF token rejected again after refresh.");
        }
        second
      }
      other => other,
    }
  }
}
