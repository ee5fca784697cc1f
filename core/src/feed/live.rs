// storefront_client/src/feed/live.rs
use super::connector::{ByteStream, EventStreamConnector};
use super::sse::{SseEvent, SseParser};
use crate::api::ResilientApiClient;
use crate::core::SharedState;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::Order;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

pub const MANUAL_REFRESH_NOTICE: &str =
  "Live order updates are unavailable. Use refresh to load the latest orders.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
  /// Reconnect attempts after a drop before giving up on live updates.
  pub max_retries: u32,
  pub base_delay: Duration,
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      max_retries: 5,
      base_delay: Duration::from_millis(1000),
    }
  }
}

impl FeedConfig {
  /// Delay before reconnect attempt `attempt` (1-based): `base_delay * 2^(attempt-1)`.
  pub fn delay_for(&self, attempt: u32) -> Duration {
    self
      .base_delay
      .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
  Connecting,
  Connected,
  Reconnecting { attempt: u32, delay: Duration },
  /// Reconnects are exhausted; only `manual_refresh` updates the list now.
  ManualRefreshOnly,
  /// The server refused the session. Terminal.
  SessionExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEventKind {
  NewOrder,
  OrderUpdated,
}

impl OrderEventKind {
  pub fn parse(name: &str) -> Option<Self> {
    match name {
      "newOrder" => Some(OrderEventKind::NewOrder),
      "orderUpdated" => Some(OrderEventKind::OrderUpdated),
      _ => None,
    }
  }
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
  #[serde(default)]
  event: Option<String>,
  order: Value,
}

#[derive(Debug, Default)]
struct FeedState {
  orders: Vec<Order>,
  connected: bool,
  retry_count: u32,
}

/// Admin-side live view of orders, fed by the server-push stream with bounded
/// reconnects and a manual fallback.
pub struct LiveOrderFeed {
  api: ResilientApiClient,
  connector: Arc<dyn EventStreamConnector>,
  config: FeedConfig,
  state: SharedState<FeedState>,
  status: watch::Sender<FeedStatus>,
}

impl LiveOrderFeed {
  pub fn new(api: ResilientApiClient, connector: Arc<dyn EventStreamConnector>, config: FeedConfig) -> Self {
    let (status, _) = watch::channel(FeedStatus::Connecting);
    Self {
      api,
      connector,
      config,
      state: SharedState::default(),
      status,
    }
  }

  pub fn subscribe(&self) -> watch::Receiver<FeedStatus> {
    self.status.subscribe()
  }

  pub fn status(&self) -> FeedStatus {
    *self.status.borrow()
  }

  /// User-facing notice for the current status, if any.
  pub fn notice(&self) -> Option<&'static str> {
    (self.status() == FeedStatus::ManualRefreshOnly).then_some(MANUAL_REFRESH_NOTICE)
  }

  pub fn orders(&self) -> Vec<Order> {
    self.state.read().orders.clone()
  }

  pub fn is_connected(&self) -> bool {
    self.state.read().connected
  }

  pub fn retry_count(&self) -> u32 {
    self.state.read().retry_count
  }

  fn set_status(&self, status: FeedStatus) {
    self.status.send_replace(status);
  }

  /// Connects and keeps the feed alive until reconnects are exhausted
  /// (`Ok`) or the session is refused (`Err(Auth)`).
  #[instrument(name = "LiveOrderFeed::run", skip(self), err(Display))]
  pub async fn run(&self) -> StorefrontResult<()> {
    self.set_status(FeedStatus::Connecting);
    loop {
      let token = self.api.session().auth_token();
      match self.connector.connect(token.as_deref()).await {
        Ok(stream) => {
          self.on_open();
          self.consume(stream).await;
        }
        Err(StorefrontError::Auth { status, message }) => {
          self.state.write().connected = false;
          self.api.expire_session(status, &message);
          self.set_status(FeedStatus::SessionExpired);
          return Err(StorefrontError::Auth { status, message });
        }
        Err(e) => warn!(error = %e, "Order update stream failed to connect."),
      }

      let attempt = self.state.update(|state| {
        state.connected = false;
        state.retry_count += 1;
        state.retry_count
      });
      if attempt > self.config.max_retries {
        info!(attempts = attempt - 1, "Reconnects exhausted, live updates paused.");
        self.set_status(FeedStatus::ManualRefreshOnly);
        return Ok(());
      }
      let delay = self.config.delay_for(attempt);
      info!(attempt, ?delay, "Reconnecting to order updates.");
      self.set_status(FeedStatus::Reconnecting { attempt, delay });
      sleep(delay).await;
    }
  }

  fn on_open(&self) {
    self.state.update(|state| {
      state.connected = true;
      state.retry_count = 0;
    });
    self.set_status(FeedStatus::Connected);
    info!("Live order updates connected.");
  }

  async fn consume(&self, mut stream: ByteStream) {
    let mut parser = SseParser::new();
    while let Some(chunk) = stream.next().await {
      match chunk {
        Ok(bytes) => {
          for event in parser.push(&bytes) {
            self.on_message(&event);
          }
        }
        Err(e) => {
          warn!(error = %e, "Order update stream broke.");
          return;
        }
      }
    }
    debug!("Order update stream ended.");
  }

  /// Applies one event. Returns the kind applied, or `None` for events that
  /// were ignored.
  pub fn on_message(&self, event: &SseEvent) -> Option<OrderEventKind> {
    let envelope: OrderEnvelope = match serde_json::from_str(&event.data) {
      Ok(envelope) => envelope,
      Err(e) => {
        warn!(error = %e, "Ignoring malformed order event.");
        return None;
      }
    };
    let name = envelope.event.as_deref().or(event.event.as_deref()).unwrap_or_default();
    let Some(kind) = OrderEventKind::parse(name) else {
      debug!(event = name, "Ignoring unrelated event.");
      return None;
    };
    let order: Order = match serde_json::from_value(envelope.order) {
      Ok(order) => order,
      Err(e) => {
        warn!(error = %e, "Ignoring order event with an unreadable order.");
        return None;
      }
    };
    debug!(?kind, order_id = %order.order_id, "Order event applied.");
    self.state.update(|state| upsert(&mut state.orders, order));
    Some(kind)
  }

  /// Reloads the full list through the REST client.
  pub async fn manual_refresh(&self) -> StorefrontResult<Vec<Order>> {
    let orders = self.api.list_orders().await?;
    self.state.write().orders = orders.clone();
    info!(count = orders.len(), "Orders refreshed.");
    Ok(orders)
  }
}

// Known orders are replaced where they stand; new ones go to the front.
fn upsert(orders: &mut Vec<Order>, order: Order) {
  match orders.iter_mut().find(|o| o.order_id == order.order_id) {
    Some(existing) => *existing = order,
    None => orders.insert(0, order),
  }
}
