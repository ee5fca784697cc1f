// storefront_client/src/checkout/flow.rs
use super::state::{CheckoutState, ErrorBanner, INVALID_COUPON_MESSAGE};
use super::step::CheckoutStep;
use super::submission::{submission_pipeline, SubmissionCtx};
use super::view::CheckoutView;
use super::CheckoutServices;
use crate::core::{PipelineResult, SharedState};
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{CartItem, CheckoutFormData, Coupon, Customer, Order, PaymentMethod};
use crate::payment::PaymentResolution;
use crate::pipeline::Pipeline;
use crate::pricing::{normalize_coupon_code, AppliedCoupon, CouponValidator, PricingSnapshot};
use crate::validation::validate_information;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of a payment submission or retry.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
  /// A submission is already in flight, or the flow is not on the Payment step.
  Ignored,
  Confirmed(Order),
  /// The order exists but its payment is unresolved; the banner offers retry or cancel.
  AwaitingPayment(Order),
  /// The user left the checkout while the submission ran. Nothing was applied.
  Superseded,
}

/// The checkout state machine.
///
/// All operations take `&self`; state lives behind a lock that is never held
/// across an await. Async work captures the state generation when it starts
/// and its result is dropped if the generation has moved on.
pub struct CheckoutFlow {
  state: SharedState<CheckoutState>,
  services: CheckoutServices,
  view: Arc<dyn CheckoutView>,
  coupons: Arc<dyn CouponValidator>,
  submission: Pipeline<SubmissionCtx>,
}

impl CheckoutFlow {
  pub fn new(
    items: Vec<CartItem>,
    services: CheckoutServices,
    view: Arc<dyn CheckoutView>,
    coupons: Arc<dyn CouponValidator>,
  ) -> Self {
    let submission = submission_pipeline(&services);
    Self {
      state: SharedState::new(CheckoutState::new(items)),
      services,
      view,
      coupons,
      submission,
    }
  }

  /// Starts from the cart persisted in the session store.
  pub fn from_saved_cart(
    services: CheckoutServices,
    view: Arc<dyn CheckoutView>,
    coupons: Arc<dyn CouponValidator>,
  ) -> Self {
    let items = services.session.cart();
    Self::new(items, services, view, coupons)
  }

  pub fn snapshot(&self) -> CheckoutState {
    self.state.read().clone()
  }

  pub fn step(&self) -> CheckoutStep {
    self.state.read().step
  }

  pub fn error(&self) -> Option<ErrorBanner> {
    self.state.read().error.clone()
  }

  pub fn is_loading(&self) -> bool {
    self.state.read().loading
  }

  pub fn form(&self) -> CheckoutFormData {
    self.state.read().form.clone()
  }

  pub fn items(&self) -> Vec<CartItem> {
    self.state.read().items.clone()
  }

  pub fn pricing(&self) -> PricingSnapshot {
    self.state.read().pricing
  }

  pub fn applied_coupon(&self) -> Option<AppliedCoupon> {
    self.state.read().coupon.clone()
  }

  pub fn pending_order(&self) -> Option<Order> {
    self.state.read().pending_order.clone()
  }

  pub fn confirmed_order(&self) -> Option<Order> {
    self.state.read().confirmed_order.clone()
  }

  /// Applies a user edit. Ignored while a request is in flight or after confirmation.
  pub fn update_form(&self, edit: impl FnOnce(&mut CheckoutFormData)) -> bool {
    self.state.update(|state| {
      if state.loading || state.step.is_terminal() {
        return false;
      }
      edit(&mut state.form);
      state.reprice();
      true
    })
  }

  pub fn dismiss_error(&self) {
    self.state.write().error = None;
  }

  #[instrument(name = "CheckoutFlow::submit_information", skip(self), err(Display))]
  pub fn submit_information(&self) -> StorefrontResult<()> {
    let result = self.state.update(|state| {
      if state.loading || state.step != CheckoutStep::Information {
        return Ok(false);
      }
      match validate_information(&state.form, &state.items, &state.pricing) {
        Ok(()) => {
          state.error = None;
          state.step = CheckoutStep::Payment;
          Ok(true)
        }
        Err(e) => {
          let err = StorefrontError::from(e);
          state.error = Some(ErrorBanner::from_error(&err, false));
          Err(err)
        }
      }
    });
    match result {
      Ok(true) => {
        self.view.step_changed(CheckoutStep::Payment);
        Ok(())
      }
      Ok(false) => Ok(()),
      Err(e) => {
        self.view.scroll_to_error();
        Err(e)
      }
    }
  }

  pub fn back_to_information(&self) -> bool {
    let moved = self.state.update(|state| {
      if state.loading || state.step != CheckoutStep::Payment {
        return false;
      }
      state.step = CheckoutStep::Information;
      state.error = None;
      true
    });
    if moved {
      self.view.step_changed(CheckoutStep::Information);
    }
    moved
  }

  pub fn select_payment_method(&self, method: PaymentMethod) -> bool {
    self.state.update(|state| {
      if state.loading || state.step != CheckoutStep::Payment {
        return false;
      }
      state.form.payment_method = method;
      true
    })
  }

  /// Returns whether the code was accepted. A rejected code clears any
  /// applied coupon.
  pub fn apply_coupon(&self, code: &str) -> bool {
    let code = normalize_coupon_code(code);
    if code.is_empty() {
      self.remove_coupon();
      return false;
    }
    let accepted = self.state.update(|state| {
      if state.loading || state.step != CheckoutStep::Payment {
        return None;
      }
      match self.coupons.validate(&code, state.pricing.subtotal) {
        Some(effect) => {
          state.coupon = Some(AppliedCoupon {
            code: code.clone(),
            effect,
          });
          state.form.coupon.code = code.clone();
          if state.error.as_ref().is_some_and(|b| b.message == INVALID_COUPON_MESSAGE) {
            state.error = None;
          }
          state.reprice();
          Some(true)
        }
        None => {
          state.coupon = None;
          state.form.coupon = Coupon::default();
          state.error = Some(ErrorBanner::message(INVALID_COUPON_MESSAGE));
          state.reprice();
          Some(false)
        }
      }
    });
    match accepted {
      Some(true) => {
        info!(%code, "Coupon applied.");
        true
      }
      Some(false) => {
        debug!(%code, "Coupon rejected.");
        self.view.scroll_to_error();
        false
      }
      None => false,
    }
  }

  pub fn remove_coupon(&self) {
    self.state.update(|state| {
      if state.loading {
        return;
      }
      state.coupon = None;
      state.form.coupon = Coupon::default();
      state.reprice();
    });
  }

  /// Places the order with the selected payment method. With a gateway method
  /// and a pending order already held, that order is paid instead of a new one
  /// being created.
  pub async fn submit_payment(&self) -> StorefrontResult<SubmitOutcome> {
    let widget_loaded = self.services.payments.widget_loaded();
    let start = self.state.update(|state| {
      if state.loading || state.step != CheckoutStep::Payment {
        return None;
      }
      let uses_gateway = state.form.payment_method.uses_gateway();
      if uses_gateway && !widget_loaded {
        return Some(Err(gateway_unavailable(state)));
      }
      state.loading = true;
      state.error = None;
      let existing = if uses_gateway { state.pending_order.clone() } else { None };
      let ctx = SubmissionCtx::new(state.form.clone(), state.items.clone(), state.pricing, existing);
      Some(Ok((ctx, state.generation)))
    });
    self.start_submission(start).await
  }

  /// Re-runs the gateway steps for the pending order without creating a new one.
  pub async fn retry_payment(&self) -> StorefrontResult<SubmitOutcome> {
    let widget_loaded = self.services.payments.widget_loaded();
    let start = self.state.update(|state| {
      if state.loading || state.step != CheckoutStep::Payment {
        return None;
      }
      let order = state.pending_order.clone()?;
      state.form.payment_method = PaymentMethod::Razorpay;
      if !widget_loaded {
        return Some(Err(gateway_unavailable(state)));
      }
      state.loading = true;
      state.error = None;
      let ctx = SubmissionCtx::new(state.form.clone(), state.items.clone(), state.pricing, Some(order));
      Some(Ok((ctx, state.generation)))
    });
    self.start_submission(start).await
  }

  // Gateway submissions fail before anything reaches the server when the
  // widget script is missing.
  async fn start_submission(
    &self,
    start: Option<StorefrontResult<(SubmissionCtx, u64)>>,
  ) -> StorefrontResult<SubmitOutcome> {
    match start {
      Some(Ok((ctx, generation))) => self.run_submission(ctx, generation).await,
      Some(Err(e)) => {
        warn!(error = %e, "Gateway submission refused before order creation.");
        self.view.scroll_to_error();
        Err(e)
      }
      None => {
        debug!("Submit ignored: not on the payment step or already in flight.");
        Ok(SubmitOutcome::Ignored)
      }
    }
  }

  #[instrument(
    name = "CheckoutFlow::submission",
    skip_all,
    fields(method = ?ctx.form.payment_method, retry = ctx.order.is_some()),
    err(Display)
  )]
  async fn run_submission(&self, ctx: SubmissionCtx, generation: u64) -> StorefrontResult<SubmitOutcome> {
    let uses_gateway = ctx.uses_gateway();
    let data = SharedState::new(ctx);
    let run = self.submission.run(data.clone()).await;
    let ctx = data.read().clone();

    let applied = self.state.update(|state| {
      if state.generation != generation {
        return None;
      }
      state.loading = false;
      let result = apply_submission(state, run, ctx, uses_gateway);
      if let Err(err) = &result {
        state.error = Some(ErrorBanner::from_error(err, state.pending_order.is_some()));
      }
      Some(result)
    });

    match applied {
      None => {
        info!("Checkout was left during submission, result discarded.");
        Ok(SubmitOutcome::Superseded)
      }
      Some(Ok(outcome @ SubmitOutcome::Confirmed(_))) => {
        self.view.step_changed(CheckoutStep::Confirmation);
        Ok(outcome)
      }
      Some(Ok(outcome)) => {
        self.view.scroll_to_error();
        Ok(outcome)
      }
      Some(Err(e)) => {
        warn!(error = %e, "Order submission failed.");
        self.view.scroll_to_error();
        Err(e)
      }
    }
  }

  /// Deletes the pending order after the user confirms. Returns `false` when
  /// there was nothing to cancel or the user declined.
  pub async fn cancel_pending_order(&self) -> StorefrontResult<bool> {
    let target = self.state.update(|state| {
      if state.loading {
        return None;
      }
      state
        .pending_order
        .as_ref()
        .map(|order| (order.order_id.clone(), state.generation))
    });
    let Some((order_id, generation)) = target else {
      return Ok(false);
    };

    let prompt = format!("Cancel order #{}? This cannot be undone.", order_id);
    if !self.view.confirm(&prompt).await {
      info!(%order_id, "Cancellation declined.");
      return Ok(false);
    }

    let started = self.state.update(|state| {
      if state.loading || state.generation != generation {
        return false;
      }
      state.loading = true;
      state.error = None;
      true
    });
    if !started {
      return Ok(false);
    }

    let result = self.services.payments.cancel_pending_order(&order_id).await;
    let applied = self.state.update(|state| {
      if state.generation != generation {
        return None;
      }
      state.loading = false;
      match &result {
        Ok(()) => {
          let moved = state.step != CheckoutStep::Payment;
          state.step = CheckoutStep::Payment;
          state.pending_order = None;
          state.error = None;
          Some(moved)
        }
        Err(e) => {
          state.error = Some(ErrorBanner::from_error(e, state.pending_order.is_some()));
          Some(false)
        }
      }
    });
    let Some(moved) = applied else {
      return Ok(false);
    };
    match result {
      Ok(()) => {
        info!(%order_id, "Pending order cancelled.");
        if moved {
          self.view.step_changed(CheckoutStep::Payment);
        }
        Ok(true)
      }
      Err(e) => {
        self.view.scroll_to_error();
        Err(e)
      }
    }
  }

  /// Recovers a gateway payment left unfinished by an earlier session. A
  /// still-pending order is restored on the Payment step; anything else is
  /// discarded and reported as expired.
  #[instrument(name = "CheckoutFlow::resume_pending", skip(self), err(Display))]
  pub async fn resume_pending(&self) -> StorefrontResult<Option<Order>> {
    let Some(stored) = self.services.payments.stored_pending() else {
      return Ok(None);
    };
    let generation = self.state.update(|state| {
      if state.loading || state.step.is_terminal() {
        return None;
      }
      state.loading = true;
      Some(state.generation)
    });
    let Some(generation) = generation else {
      return Ok(None);
    };

    let result = self
      .services
      .payments
      .check_pending_order_status(&stored.order_id)
      .await;
    let applied = self.state.update(|state| {
      if state.generation != generation {
        return None;
      }
      state.loading = false;
      Some(match &result {
        Ok(order) => {
          let moved = state.step != CheckoutStep::Payment;
          state.step = CheckoutStep::Payment;
          state.pending_order = Some(order.clone());
          state.form.payment_method = PaymentMethod::Razorpay;
          if state.form.customer == Customer::default() {
            state.form.customer = order.customer.clone();
            state.form.shipping_address = order.shipping_address.clone();
          }
          state.error = Some(ErrorBanner::resumed(&order.order_id));
          moved
        }
        Err(e) => {
          state.error = Some(ErrorBanner::from_error(e, false));
          false
        }
      })
    });

    let Some(moved) = applied else {
      return Ok(None);
    };
    if moved {
      self.view.step_changed(CheckoutStep::Payment);
    }
    self.view.scroll_to_error();
    result.map(Some)
  }

  /// Leaves the checkout. Anything still in flight is superseded.
  pub fn navigate_away(&self) {
    self.state.update(|state| {
      state.generation += 1;
      state.loading = false;
      state.error = None;
    });
    debug!("Checkout left.");
  }
}

fn gateway_unavailable(state: &mut CheckoutState) -> StorefrontError {
  let err = StorefrontError::GatewayUnavailable;
  state.error = Some(ErrorBanner::from_error(&err, state.pending_order.is_some()));
  err
}

fn apply_submission(
  state: &mut CheckoutState,
  run: StorefrontResult<PipelineResult>,
  ctx: SubmissionCtx,
  uses_gateway: bool,
) -> StorefrontResult<SubmitOutcome> {
  match run {
    Ok(PipelineResult::Completed) => {
      let order = ctx
        .confirmed
        .ok_or_else(|| StorefrontError::Internal("submission completed without an order".to_string()))?;
      state.step = CheckoutStep::Confirmation;
      state.confirmed_order = Some(order.clone());
      state.pending_order = None;
      state.error = None;
      Ok(SubmitOutcome::Confirmed(order))
    }
    Ok(PipelineResult::Stopped) => match ctx.resolution {
      Some(PaymentResolution::Unresolved { order, reason }) => {
        state.error = Some(ErrorBanner::unresolved(&order.order_id, &reason));
        state.pending_order = Some(order.clone());
        Ok(SubmitOutcome::AwaitingPayment(order))
      }
      _ => Err(StorefrontError::Internal(
        "submission stopped without an unresolved payment".to_string(),
      )),
    },
    Err(err) => {
      if matches!(err, StorefrontError::StateConflict { .. }) {
        state.pending_order = None;
      } else if uses_gateway {
        if let Some(order) = ctx.order.filter(|o| o.payment_status.is_pending()) {
          state.pending_order = Some(order);
        }
      }
      Err(err)
    }
  }
}
