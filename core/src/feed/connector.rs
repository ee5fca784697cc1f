// storefront_client/src/feed/connector.rs
use crate::api::transport::map_reqwest_error;
use crate::api::TransportError;
use crate::error::{StorefrontError, StorefrontResult};
use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};
use std::time::Duration;
use tracing::debug;

pub const ORDER_UPDATES_PATH: &str = "/api/order-updates";

/// Raw body chunks of an open event stream.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

/// Opens the server-push stream of order events.
#[async_trait]
pub trait EventStreamConnector: Send + Sync {
  /// `Auth` when the server refuses the session; anything else is retried.
  async fn connect(&self, token: Option<&str>) -> StorefrontResult<ByteStream>;
}

/// Reqwest-backed connector. It uses its own client: a whole-request timeout
/// would cut a long-lived stream, so only the connect phase is bounded.
#[derive(Debug, Clone)]
pub struct ReqwestEventStream {
  client: reqwest::Client,
  base_url: String,
}

impl ReqwestEventStream {
  pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, TransportError> {
    let client = reqwest::Client::builder()
      .connect_timeout(connect_timeout)
      .build()
      .map_err(map_reqwest_error)?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }
}

#[async_trait]
impl EventStreamConnector for ReqwestEventStream {
  async fn connect(&self, token: Option<&str>) -> StorefrontResult<ByteStream> {
    let url = format!("{}{}", self.base_url, ORDER_UPDATES_PATH);
    let mut request = self
      .client
      .get(&url)
      .header(reqwest::header::ACCEPT, "text/event-stream");
    if let Some(token) = token {
      request = request.query(&[("token", token)]);
    }
    let response = request
      .send()
      .await
      .map_err(|e| StorefrontError::TransientNetwork(map_reqwest_error(e).to_string()))?;

    let status = response.status();
    match status.as_u16() {
      401 | 403 => {
        return Err(StorefrontError::Auth {
          status: status.as_u16(),
          message: "order updates refused the session".to_string(),
        })
      }
      _ if !status.is_success() => {
        return Err(StorefrontError::TransientNetwork(format!(
          "{} returned {}",
          ORDER_UPDATES_PATH, status
        )))
      }
      _ => {}
    }
    debug!(%url, "Order update stream opened.");
    Ok(
      response
        .bytes_stream()
        .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(map_reqwest_error))
        .boxed(),
    )
  }
}
