// storefront_client/src/checkout/state.rs
use super::step::CheckoutStep;
use crate::error::StorefrontError;
use crate::models::{CartItem, CheckoutFormData, Order};
use crate::payment::UnresolvedReason;
use crate::pricing::{AppliedCoupon, PricingSnapshot};
use crate::validation::FormField;

pub const INVALID_COUPON_MESSAGE: &str = "Invalid coupon code";

/// Choices offered next to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
  RetryPayment,
  CancelPendingOrder,
  SwitchToCashOnDelivery,
  SignIn,
}

/// The dismissible error shown above the active step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
  pub message: String,
  pub field: Option<FormField>,
  pub actions: Vec<RecoveryAction>,
}

impl ErrorBanner {
  pub fn message(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      field: None,
      actions: Vec::new(),
    }
  }

  /// Banner for a failed operation. `has_pending` says whether a pending order
  /// is still held, which makes retry and cancel available.
  pub fn from_error(err: &StorefrontError, has_pending: bool) -> Self {
    let pending_actions = || {
      if has_pending {
        vec![RecoveryAction::RetryPayment, RecoveryAction::CancelPendingOrder]
      } else {
        Vec::new()
      }
    };
    let (field, actions) = match err {
      StorefrontError::Validation(e) => (Some(e.field), Vec::new()),
      StorefrontError::Auth { .. } => (None, vec![RecoveryAction::SignIn]),
      StorefrontError::GatewayUnavailable => {
        let mut actions = vec![RecoveryAction::SwitchToCashOnDelivery];
        actions.extend(pending_actions());
        (None, actions)
      }
      StorefrontError::StateConflict { .. } => (None, Vec::new()),
      _ => (None, pending_actions()),
    };
    Self {
      message: err.user_message(),
      field,
      actions,
    }
  }

  pub fn unresolved(order_id: &str, reason: &UnresolvedReason) -> Self {
    let message = match reason {
      UnresolvedReason::Dismissed => format!(
        "Payment for order #{} was not completed. You can retry the payment or cancel the order.",
        order_id
      ),
      UnresolvedReason::VerificationFailed(why) => format!(
        "We could not confirm the payment for order #{} ({}). You can retry the payment or cancel the order.",
        order_id, why
      ),
    };
    Self {
      message,
      field: None,
      actions: vec![RecoveryAction::RetryPayment, RecoveryAction::CancelPendingOrder],
    }
  }

  pub fn resumed(order_id: &str) -> Self {
    Self {
      message: format!(
        "You have an unfinished payment for order #{}. Retry the payment or cancel the order.",
        order_id
      ),
      field: None,
      actions: vec![RecoveryAction::RetryPayment, RecoveryAction::CancelPendingOrder],
    }
  }

  pub fn offers(&self, action: RecoveryAction) -> bool {
    self.actions.contains(&action)
  }
}

/// Everything the checkout screen renders from.
#[derive(Debug, Clone)]
pub struct CheckoutState {
  pub step: CheckoutStep,
  pub items: Vec<CartItem>,
  pub form: CheckoutFormData,
  pub coupon: Option<AppliedCoupon>,
  pub pricing: PricingSnapshot,
  pub error: Option<ErrorBanner>,
  pub loading: bool,
  /// Created on the server, awaiting a gateway payment.
  pub pending_order: Option<Order>,
  pub confirmed_order: Option<Order>,
  /// Bumped whenever in-flight work must no longer be applied.
  pub generation: u64,
}

impl CheckoutState {
  pub fn new(items: Vec<CartItem>) -> Self {
    let pricing = PricingSnapshot::for_items(&items, None);
    let mut state = Self {
      step: CheckoutStep::Information,
      items,
      form: CheckoutFormData::default(),
      coupon: None,
      pricing,
      error: None,
      loading: false,
      pending_order: None,
      confirmed_order: None,
      generation: 0,
    };
    state.reprice();
    state
  }

  /// Recomputes pricing and mirrors it into the form's shipping and coupon fields.
  pub fn reprice(&mut self) {
    self.pricing = PricingSnapshot::for_items(&self.items, self.coupon.as_ref().map(|c| c.effect));
    self.form.shipping_method.cost = self.pricing.shipping_cost;
    self.form.coupon.discount = self.pricing.coupon_discount;
  }
}
