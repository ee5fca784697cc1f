// storefront_client/src/payment/session.rs
use super::widget::{GatewayFailure, GatewayPaymentResponse, PaymentWidget, WidgetConfig, WidgetOutcome, WidgetPrefill, WidgetTheme};
use crate::api::{GatewayHandle, ResilientApiClient, VerifyPaymentRequest};
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{Order, PaymentStatus, PendingTransaction};
use crate::pricing::to_minor_units;
use crate::store::SessionStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
  pub currency: String,
  pub merchant_name: String,
  pub theme_color: String,
}

impl Default for GatewaySettings {
  fn default() -> Self {
    Self {
      currency: "INR".to_string(),
      merchant_name: "Storefront".to_string(),
      theme_color: "#3399cc".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
  VerificationFailed(String),
  Dismissed,
}

/// Where a widget outcome left the order.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentResolution {
  Verified(Order),
  /// The order is still pending on the server; the user may retry or cancel.
  Unresolved { order: Order, reason: UnresolvedReason },
}

/// Drives one gateway payment for an existing storefront order and keeps the
/// persisted `PendingTransaction` in step with it.
pub struct PaymentGatewaySession {
  api: ResilientApiClient,
  session: SessionStore,
  widget: Arc<dyn PaymentWidget>,
  settings: GatewaySettings,
}

impl PaymentGatewaySession {
  pub fn new(api: ResilientApiClient, widget: Arc<dyn PaymentWidget>, settings: GatewaySettings) -> Self {
    let session = api.session().clone();
    Self {
      api,
      session,
      widget,
      settings,
    }
  }

  pub fn widget_loaded(&self) -> bool {
    self.widget.is_loaded()
  }

  #[instrument(name = "PaymentGatewaySession::initiate", skip(self), err(Display))]
  pub async fn initiate(&self, order_id: &str) -> StorefrontResult<GatewayHandle> {
    let handle = self.api.initiate_razorpay_payment(order_id).await?;
    self
      .session
      .save_pending_transaction(&PendingTransaction::new(order_id, handle.gateway_order_id.as_str()))?;
    info!(gateway_order_id = %handle.gateway_order_id, "Gateway order initiated.");
    Ok(handle)
  }

  pub fn widget_config(&self, handle: &GatewayHandle, order: &Order) -> WidgetConfig {
    let mut notes = BTreeMap::new();
    notes.insert("orderId".to_string(), order.order_id.clone());
    WidgetConfig {
      key: handle.key_id.clone(),
      amount: handle.amount_minor.unwrap_or_else(|| to_minor_units(order.total)),
      currency: handle.currency.clone().unwrap_or_else(|| self.settings.currency.clone()),
      name: self.settings.merchant_name.clone(),
      description: format!("Order #{}", order.order_id),
      order_id: handle.gateway_order_id.clone(),
      prefill: WidgetPrefill {
        name: order.customer.full_name(),
        email: order.customer.email.clone(),
        contact: order.customer.phone.clone(),
      },
      notes,
      theme: WidgetTheme {
        color: self.settings.theme_color.clone(),
      },
    }
  }

  /// Opens the widget and waits for its single outcome.
  #[instrument(name = "PaymentGatewaySession::open", skip_all, fields(order_id = %order.order_id), err(Display))]
  pub async fn open(&self, handle: &GatewayHandle, order: &Order) -> StorefrontResult<WidgetOutcome> {
    if !self.widget.is_loaded() {
      return Err(StorefrontError::GatewayUnavailable);
    }
    let outcome = self.widget.open(self.widget_config(handle, order)).await;
    debug!(?outcome, "Widget closed.");
    Ok(outcome)
  }

  pub async fn resolve(&self, order: &Order, outcome: WidgetOutcome) -> StorefrontResult<PaymentResolution> {
    match outcome {
      WidgetOutcome::Succeeded(response) => self.on_success(order, &response).await,
      WidgetOutcome::Failed(failure) => Err(self.on_failure(order, &failure)),
      WidgetOutcome::Dismissed => self.on_dismiss(order).await,
    }
  }

  #[instrument(name = "PaymentGatewaySession::on_success", skip_all, fields(order_id = %order.order_id), err(Display))]
  pub async fn on_success(
    &self,
    order: &Order,
    response: &GatewayPaymentResponse,
  ) -> StorefrontResult<PaymentResolution> {
    let request = VerifyPaymentRequest {
      order_id: order.order_id.clone(),
      razorpay_payment_id: response.razorpay_payment_id.clone(),
      razorpay_order_id: response.razorpay_order_id.clone(),
      razorpay_signature: response.razorpay_signature.clone(),
    };

    let reason = match self.api.verify_razorpay_payment(&request).await {
      Ok(result) if result.success => {
        self.session.clear_pending_transaction()?;
        self.session.clear_cart()?;
        let verified = result.order.unwrap_or_else(|| {
          let mut paid = order.clone();
          paid.payment_status = PaymentStatus::Paid;
          paid.razorpay_order_id = Some(response.razorpay_order_id.clone());
          paid.razorpay_payment_id = Some(response.razorpay_payment_id.clone());
          paid
        });
        info!("Payment verified.");
        return Ok(PaymentResolution::Verified(verified));
      }
      Ok(result) => result
        .message
        .unwrap_or_else(|| "Payment verification failed".to_string()),
      Err(e @ StorefrontError::Auth { .. }) => return Err(e),
      Err(e) => {
        warn!(error = %e, "Payment verification call failed.");
        e.user_message()
      }
    };
    self.recheck(order, UnresolvedReason::VerificationFailed(reason)).await
  }

  /// The widget's failure as an error; the pending order and record stay as they are.
  pub fn on_failure(&self, order: &Order, failure: &GatewayFailure) -> StorefrontError {
    warn!(order_id = %order.order_id, code = ?failure.code, reason = ?failure.reason, "Gateway reported a failed payment.");
    StorefrontError::Gateway {
      order_id: order.order_id.clone(),
      reason: failure.description.clone(),
    }
  }

  pub async fn on_dismiss(&self, order: &Order) -> StorefrontResult<PaymentResolution> {
    info!(order_id = %order.order_id, "Payment widget dismissed.");
    self.recheck(order, UnresolvedReason::Dismissed).await
  }

  async fn recheck(&self, order: &Order, reason: UnresolvedReason) -> StorefrontResult<PaymentResolution> {
    let current = self.check_pending_order_status(&order.order_id).await?;
    Ok(PaymentResolution::Unresolved { order: current, reason })
  }

  /// The order as the server sees it, provided it is still awaiting payment.
  /// A missing or settled order discards the local record and is reported as
  /// `StateConflict`.
  #[instrument(name = "PaymentGatewaySession::check_pending", skip(self), err(Display))]
  pub async fn check_pending_order_status(&self, order_id: &str) -> StorefrontResult<Order> {
    match self.api.pending_order(order_id).await? {
      Some(order) if order.payment_status.is_pending() => Ok(order),
      other => {
        let status = other.map(|o| o.payment_status);
        warn!(?status, "Pending order is gone or settled, discarding local record.");
        self.session.clear_pending_transaction()?;
        Err(StorefrontError::StateConflict {
          order_id: order_id.to_string(),
        })
      }
    }
  }

  #[instrument(name = "PaymentGatewaySession::cancel", skip(self), err(Display))]
  pub async fn cancel_pending_order(&self, order_id: &str) -> StorefrontResult<()> {
    match self.api.delete_order(order_id).await {
      Ok(()) => {}
      Err(StorefrontError::NotFound(_)) => debug!("Order already gone on the server."),
      Err(e) => return Err(e),
    }
    self.session.clear_pending_transaction()
  }

  pub fn stored_pending(&self) -> Option<PendingTransaction> {
    self.session.pending_transaction()
  }
}
