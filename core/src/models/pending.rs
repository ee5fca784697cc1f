// storefront_client/src/models/pending.rs
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A gateway payment that was started but not yet resolved.
///
/// Persisted as one JSON value so a reload can find and recover it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
  pub order_id: String,
  pub razorpay_order_id: String,
  /// Epoch milliseconds at which the gateway order was initiated.
  pub timestamp: i64,
}

impl PendingTransaction {
  pub fn new(order_id: impl Into<String>, razorpay_order_id: impl Into<String>) -> Self {
    Self {
      order_id: order_id.into(),
      razorpay_order_id: razorpay_order_id.into(),
      timestamp: Utc::now().timestamp_millis(),
    }
  }
}
