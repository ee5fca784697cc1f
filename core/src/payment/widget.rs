// storefront_client/src/payment/widget.rs

//! The hosted payment widget, seen from the client: a config goes in, exactly
//! one outcome comes out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetPrefill {
  pub name: String,
  pub email: String,
  pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetTheme {
  pub color: String,
}

/// Options handed to the widget when it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetConfig {
  pub key: String,
  /// Minor currency units (paise).
  pub amount: i64,
  pub currency: String,
  pub name: String,
  pub description: String,
  pub order_id: String,
  pub prefill: WidgetPrefill,
  pub notes: BTreeMap<String, String>,
  pub theme: WidgetTheme,
}

/// Signed payload the widget returns on a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPaymentResponse {
  pub razorpay_payment_id: String,
  pub razorpay_order_id: String,
  pub razorpay_signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFailure {
  #[serde(default)]
  pub code: Option<String>,
  pub description: String,
  #[serde(default)]
  pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
  Succeeded(GatewayPaymentResponse),
  Failed(GatewayFailure),
  /// Closed by the user without paying.
  Dismissed,
}

#[async_trait]
pub trait PaymentWidget: Send + Sync {
  /// Whether the widget script is available. Opening an unloaded widget fails fast.
  fn is_loaded(&self) -> bool;

  async fn open(&self, config: WidgetConfig) -> WidgetOutcome;
}

/// Stand-in for environments with no widget at all; only Cash on Delivery works.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableWidget;

#[async_trait]
impl PaymentWidget for UnavailableWidget {
  fn is_loaded(&self) -> bool {
    false
  }

  async fn open(&self, _config: WidgetConfig) -> WidgetOutcome {
    WidgetOutcome::Dismissed
  }
}
