// storefront_client/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::validation::ValidationError;

/// Generic text shown to the user when an error carries nothing safe to display.
pub const GENERIC_FAILURE_MESSAGE: &str = "Operation failed. Please try again.";

#[derive(Debug, Error)]
pub enum StorefrontError {
  /// Client-side form validation. Never sent to the server.
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The server rejected the CSRF token, even after a refresh.
  #[error("CSRF token rejected: {message}")]
  Csrf { message: String },

  /// Session expired or unauthorized. Local auth state has been cleared.
  #[error("Session expired ({status}): {message}")]
  Auth { status: u16, message: String },

  #[error("Network error: {0}")]
  TransientNetwork(String),

  /// The payment widget reported a failure. The order stays pending.
  #[error("Payment failed for order {order_id}: {reason}")]
  Gateway { order_id: String, reason: String },

  /// The pending order is gone or no longer pending on the server.
  #[error("Payment session for order {order_id} has expired")]
  StateConflict { order_id: String },

  #[error("Payment gateway could not be initialized: {0}")]
  GatewayInit(String),

  #[error("Payment gateway script is not loaded")]
  GatewayUnavailable,

  #[error("Malformed response from {endpoint}: {message}")]
  MalformedResponse { endpoint: String, message: String },

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Request failed with status {status}: {message}")]
  Api { status: u16, message: String },

  #[error("Client storage error: {0}")]
  Storage(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl StorefrontError {
  /// Failures worth retrying with backoff: lost connections, timeouts, overloaded upstreams.
  pub fn is_transient(&self) -> bool {
    matches!(self, StorefrontError::TransientNetwork(_))
  }

  /// Errors after which the pending order can still be paid.
  pub fn is_payment_retryable(&self) -> bool {
    matches!(
      self,
      StorefrontError::Gateway { .. }
        | StorefrontError::GatewayInit(_)
        | StorefrontError::GatewayUnavailable
        | StorefrontError::TransientNetwork(_)
    )
  }

  /// Text that is safe to put in the error banner.
  pub fn user_message(&self) -> String {
    match self {
      StorefrontError::Validation(e) => e.to_string(),
      StorefrontError::Csrf { .. } => {
        "Your security token has expired. Please refresh the page and try again.".to_string()
      }
      StorefrontError::Auth { .. } => "Your session has expired. Please sign in again.".to_string(),
      StorefrontError::TransientNetwork(_) => {
        "We could not reach the server. Check your connection and try again.".to_string()
      }
      StorefrontError::Gateway { reason, .. } => format!(
        "Payment failed: {}. You can retry the payment or cancel the order.",
        reason
      ),
      StorefrontError::StateConflict { .. } => {
        "Your payment session has expired. Please place your order again.".to_string()
      }
      StorefrontError::GatewayInit(_) => {
        "We could not start the payment. Your order is saved, please retry the payment.".to_string()
      }
      StorefrontError::GatewayUnavailable => {
        "The payment gateway is still loading. Please try again shortly or choose Cash on Delivery.".to_string()
      }
      StorefrontError::Api { message, .. } | StorefrontError::NotFound(message) if !message.is_empty() => {
        message.clone()
      }
      _ => GENERIC_FAILURE_MESSAGE.to_string(),
    }
  }
}

impl From<AnyhowError> for StorefrontError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap instead of nesting when the anyhow error already carries one of ours.
    match err.downcast::<StorefrontError>() {
      Ok(inner) => inner,
      Err(other) => StorefrontError::Internal(format!("{:#}", other)),
    }
  }
}

pub type StorefrontResult<T, E = StorefrontError> = std::result::Result<T, E>;
