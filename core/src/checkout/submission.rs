// storefront_client/src/checkout/submission.rs

//! The order submission as a pipeline:
//! `create_order → initiate_gateway → open_widget → resolve_payment → finalize_order`.
//!
//! Cash on Delivery skips the three gateway steps. A retry starts with the
//! order already present, so `create_order` is skipped. An unresolved payment
//! stops the run before `finalize_order`.

use super::CheckoutServices;
use crate::api::{GatewayHandle, ResilientApiClient};
use crate::core::{PipelineControl, SharedState};
use crate::error::{StorefrontError, StorefrontResult};
use crate::models::{CartItem, CheckoutFormData, Order, OrderSubmission};
use crate::payment::{PaymentGatewaySession, PaymentResolution, WidgetOutcome};
use crate::pipeline::Pipeline;
use crate::pricing::PricingSnapshot;
use crate::store::SessionStore;
use std::sync::Arc;
use tracing::info;

pub const CREATE_ORDER: &str = "create_order";
pub const INITIATE_GATEWAY: &str = "initiate_gateway";
pub const OPEN_WIDGET: &str = "open_widget";
pub const RESOLVE_PAYMENT: &str = "resolve_payment";
pub const FINALIZE_ORDER: &str = "finalize_order";

/// Data threaded through one submission attempt.
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
  pub form: CheckoutFormData,
  pub items: Vec<CartItem>,
  pub pricing: PricingSnapshot,
  pub order: Option<Order>,
  pub handle: Option<GatewayHandle>,
  pub outcome: Option<WidgetOutcome>,
  pub resolution: Option<PaymentResolution>,
  pub confirmed: Option<Order>,
}

impl SubmissionCtx {
  pub fn new(form: CheckoutFormData, items: Vec<CartItem>, pricing: PricingSnapshot, existing: Option<Order>) -> Self {
    Self {
      form,
      items,
      pricing,
      order: existing,
      handle: None,
      outcome: None,
      resolution: None,
      confirmed: None,
    }
  }

  pub fn uses_gateway(&self) -> bool {
    self.form.payment_method.uses_gateway()
  }
}

fn missing(what: &str) -> StorefrontError {
  StorefrontError::Internal(format!("submission reached a step without {}", what))
}

fn current_order(data: &SharedState<SubmissionCtx>) -> StorefrontResult<Order> {
  data.read().order.clone().ok_or_else(|| missing("an order"))
}

async fn create_order(api: ResilientApiClient, data: SharedState<SubmissionCtx>) -> StorefrontResult<PipelineControl> {
  let submission = {
    let ctx = data.read();
    OrderSubmission::freeze(&ctx.form, &ctx.items, &ctx.pricing)
  };
  let order = api.create_order(&submission).await?;
  data.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

async fn initiate_gateway(
  payments: Arc<PaymentGatewaySession>,
  data: SharedState<SubmissionCtx>,
) -> StorefrontResult<PipelineControl> {
  let order = current_order(&data)?;
  let handle = payments.initiate(&order.order_id).await?;
  data.write().handle = Some(handle);
  Ok(PipelineControl::Continue)
}

async fn open_widget(
  payments: Arc<PaymentGatewaySession>,
  data: SharedState<SubmissionCtx>,
) -> StorefrontResult<PipelineControl> {
  let order = current_order(&data)?;
  let handle = data.read().handle.clone().ok_or_else(|| missing("a gateway handle"))?;
  let outcome = payments.open(&handle, &order).await?;
  data.write().outcome = Some(outcome);
  Ok(PipelineControl::Continue)
}

async fn resolve_payment(
  payments: Arc<PaymentGatewaySession>,
  data: SharedState<SubmissionCtx>,
) -> StorefrontResult<PipelineControl> {
  let order = current_order(&data)?;
  let outcome = data.write().outcome.take().ok_or_else(|| missing("a widget outcome"))?;
  let resolution = payments.resolve(&order, outcome).await?;
  let control = match &resolution {
    PaymentResolution::Verified(_) => PipelineControl::Continue,
    PaymentResolution::Unresolved { .. } => PipelineControl::Stop,
  };
  data.write().resolution = Some(resolution);
  Ok(control)
}

async fn finalize_order(session: SessionStore, data: SharedState<SubmissionCtx>) -> StorefrontResult<PipelineControl> {
  let confirmed = {
    let ctx = data.read();
    let confirmed = match &ctx.resolution {
      Some(PaymentResolution::Verified(order)) => Some(order.clone()),
      _ => ctx.order.clone(),
    };
    confirmed
  };
  let confirmed = confirmed.ok_or_else(|| missing("an order"))?;
  session.clear_cart()?;
  session.clear_pending_transaction()?;
  info!(order_id = %confirmed.order_id, status = ?confirmed.payment_status, "Order confirmed.");
  data.write().confirmed = Some(confirmed);
  Ok(PipelineControl::Continue)
}

pub fn submission_pipeline(services: &CheckoutServices) -> Pipeline<SubmissionCtx> {
  let mut pipeline = Pipeline::new(&[CREATE_ORDER, INITIATE_GATEWAY, OPEN_WIDGET, RESOLVE_PAYMENT, FINALIZE_ORDER]);

  pipeline.skip_if(CREATE_ORDER, |ctx: &SubmissionCtx| ctx.order.is_some());
  for step in [INITIATE_GATEWAY, OPEN_WIDGET, RESOLVE_PAYMENT] {
    pipeline.skip_if(step, |ctx: &SubmissionCtx| !ctx.uses_gateway());
  }

  let api = services.api.clone();
  pipeline.on(CREATE_ORDER, move |data| create_order(api.clone(), data));
  let payments = services.payments.clone();
  pipeline.on(INITIATE_GATEWAY, move |data| initiate_gateway(payments.clone(), data));
  let payments = services.payments.clone();
  pipeline.on(OPEN_WIDGET, move |data| open_widget(payments.clone(), data));
  let payments = services.payments.clone();
  pipeline.on(RESOLVE_PAYMENT, move |data| resolve_payment(payments.clone(), data));
  let session = services.session.clone();
  pipeline.on(FINALIZE_ORDER, move |data| finalize_order(session.clone(), data));

  pipeline
}
