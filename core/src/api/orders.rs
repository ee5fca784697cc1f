// storefront_client/src/api/orders.rs

//! Typed order endpoints. Responses are parsed into explicit types here so
//! nothing above the client trusts the shape of a JSON payload.

use super::client::ResilientApiClient;
use super::transport::Method;
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Order, OrderSubmission};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument};

pub const ORDERS_PATH: &str = "/api/orders";
pub const INITIATE_PAYMENT_PATH: &str = "/api/orders/initiate-razorpay-payment";
pub const VERIFY_PAYMENT_PATH: &str = "/api/orders/verify-razorpay-payment";

/// What the widget needs from a freshly initiated gateway order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayHandle {
  pub gateway_order_id: String,
  pub key_id: String,
  /// Amount as booked by the gateway, when the server echoes it.
  pub amount_minor: Option<i64>,
  pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitiatePaymentResponse {
  razorpay_order_id: Option<String>,
  key_id: Option<String>,
  #[serde(default)]
  order_data: Option<GatewayOrderData>,
}

#[derive(Debug, Deserialize)]
struct GatewayOrderData {
  amount: Option<i64>,
  currency: Option<String>,
}

/// Body of the verification call. Field names follow the gateway callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyPaymentRequest {
  #[serde(rename = "orderId")]
  pub order_id: String,
  pub razorpay_payment_id: String,
  pub razorpay_order_id: String,
  pub razorpay_signature: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerificationResult {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub order: Option<Order>,
  #[serde(default)]
  pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderEnvelope {
  order: Order,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderPayload {
  Wrapped(OrderEnvelope),
  Bare(Order),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderListPayload {
  Wrapped { orders: Vec<Order> },
  Bare(Vec<Order>),
}

fn parse<T: DeserializeOwned>(endpoint: &str, body: Value) -> StorefrontResult<T> {
  serde_json::from_value(body).map_err(|e| StorefrontError::MalformedResponse {
    endpoint: endpoint.to_string(),
    message: e.to_string(),
  })
}

impl ResilientApiClient {
  #[instrument(name = "orders::create", skip_all, fields(method = ?submission.payment_method), err(Display))]
  pub async fn create_order(&self, submission: &OrderSubmission) -> StorefrontResult<Order> {
    let body = serde_json::to_value(submission).map_err(|e| StorefrontError::Internal(e.to_string()))?;
    let response = self.send(Method::POST, ORDERS_PATH, Some(body)).await?;
    let envelope: OrderEnvelope = parse(ORDERS_PATH, response)?;
    info!(order_id = %envelope.order.order_id, "Order created.");
    Ok(envelope.order)
  }

  pub async fn list_orders(&self) -> StorefrontResult<Vec<Order>> {
    let response = self.send(Method::GET, ORDERS_PATH, None).await?;
    Ok(match parse(ORDERS_PATH, response)? {
      OrderListPayload::Wrapped { orders } | OrderListPayload::Bare(orders) => orders,
    })
  }

  /// The server's view of a pending order. `None` when it no longer exists.
  #[instrument(name = "orders::pending", skip(self), err(Display))]
  pub async fn pending_order(&self, order_id: &str) -> StorefrontResult<Option<Order>> {
    let path = format!("{}/pending/{}", ORDERS_PATH, order_id);
    match self.send(Method::GET, &path, None).await {
      Ok(body) => Ok(Some(match parse(&path, body)? {
        OrderPayload::Wrapped(envelope) => envelope.order,
        OrderPayload::Bare(order) => order,
      })),
      Err(StorefrontError::NotFound(_)) => Ok(None),
      Err(e) => Err(e),
    }
  }

  #[instrument(name = "orders::delete", skip(self), err(Display))]
  pub async fn delete_order(&self, order_id: &str) -> StorefrontResult<()> {
    let path = format!("{}/{}", ORDERS_PATH, order_id);
    self.send(Method::DELETE, &path, None).await?;
    info!(%order_id, "Order deleted.");
    Ok(())
  }

  /// Creates the gateway-side order. A response without a gateway order id or
  /// key is a `GatewayInit` failure; the storefront order is left untouched.
  #[instrument(name = "orders::initiate_payment", skip(self), err(Display))]
  pub async fn initiate_razorpay_payment(&self, order_id: &str) -> StorefrontResult<GatewayHandle> {
    let response = self
      .send(Method::POST, INITIATE_PAYMENT_PATH, Some(json!({ "orderId": order_id })))
      .await?;
    let parsed: InitiatePaymentResponse =
      serde_json::from_value(response).map_err(|e| StorefrontError::GatewayInit(e.to_string()))?;

    let gateway_order_id = parsed
      .razorpay_order_id
      .filter(|id| !id.is_empty())
      .ok_or_else(|| StorefrontError::GatewayInit("response is missing razorpayOrderId".to_string()))?;
    let key_id = parsed
      .key_id
      .filter(|key| !key.is_empty())
      .ok_or_else(|| StorefrontError::GatewayInit("response is missing keyId".to_string()))?;
    let (amount_minor, currency) = parsed
      .order_data
      .map(|data| (data.amount, data.currency))
      .unwrap_or_default();

    Ok(GatewayHandle {
      gateway_order_id,
      key_id,
      amount_minor,
      currency,
    })
  }

  #[instrument(name = "orders::verify_payment", skip_all, fields(order_id = %request.order_id), err(Display))]
  pub async fn verify_razorpay_payment(&self, request: &VerifyPaymentRequest) -> StorefrontResult<VerificationResult> {
    let body = serde_json::to_value(request).map_err(|e| StorefrontError::Internal(e.to_string()))?;
    let response = self.send(Method::POST, VERIFY_PAYMENT_PATH, Some(body)).await?;
    parse(VERIFY_PAYMENT_PATH, response)
  }
}
