// storefront_client/src/models/order.rs
use super::{CartItem, CheckoutFormData, Coupon, Customer, GstDetails, PaymentMethod, ShippingAddress, ShippingMethod};
use crate::pricing::PricingSnapshot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment state of a server-side order.
///
/// `Paid` is the single terminal-success value. Some backend paths report
/// "Success" for the same state; it is folded into `Paid` when parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
  #[default]
  Pending,
  #[serde(alias = "Success")]
  Paid,
  Failed,
  #[serde(other)]
  Unknown,
}

impl PaymentStatus {
  pub fn is_pending(self) -> bool {
    self == PaymentStatus::Pending
  }
}

/// An order as the server reports it. The client only mirrors it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub order_id: String,
  #[serde(default)]
  pub customer: Customer,
  #[serde(default)]
  pub shipping_address: ShippingAddress,
  #[serde(default)]
  pub shipping_method: ShippingMethod,
  #[serde(default)]
  pub coupon: Coupon,
  #[serde(default)]
  pub items: Vec<CartItem>,
  #[serde(default)]
  pub total: Decimal,
  #[serde(default)]
  pub payment_method: PaymentMethod,
  #[serde(default)]
  pub payment_status: PaymentStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub razorpay_order_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub razorpay_payment_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
}

/// The checkout form frozen at submit time; body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
  pub customer: Customer,
  pub shipping_address: ShippingAddress,
  pub shipping_method: ShippingMethod,
  pub coupon: Coupon,
  pub gst_details: GstDetails,
  pub items: Vec<CartItem>,
  pub subtotal: Decimal,
  pub total: Decimal,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
}

impl OrderSubmission {
  /// COD orders are recorded as paid up front; gateway orders start pending.
  pub fn freeze(form: &CheckoutFormData, items: &[CartItem], pricing: &PricingSnapshot) -> Self {
    let payment_status = if form.payment_method.uses_gateway() {
      PaymentStatus::Pending
    } else {
      PaymentStatus::Paid
    };
    let mut shipping_method = form.shipping_method.clone();
    shipping_method.cost = pricing.shipping_cost;
    let mut coupon = form.coupon.clone();
    coupon.discount = pricing.coupon_discount;

    Self {
      customer: form.customer.clone(),
      shipping_address: form.shipping_address.clone(),
      shipping_method,
      coupon,
      gst_details: form.gst_details.clone(),
      items: items.to_vec(),
      subtotal: pricing.subtotal,
      total: pricing.total,
      payment_method: form.payment_method,
      payment_status,
    }
  }
}
