// storefront_client/src/models/checkout_form.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub phone: String,
}

impl Customer {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name.trim(), self.last_name.trim())
      .trim()
      .to_string()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
  pub address1: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address2: Option<String>,
  pub city: String,
  pub state: String,
  pub pincode: String,
  pub country: String,
}

impl Default for ShippingAddress {
  fn default() -> Self {
    Self {
      address1: String::new(),
      address2: None,
      city: String::new(),
      state: String::new(),
      pincode: String::new(),
      country: "India".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingMethod {
  #[serde(rename = "type")]
  pub kind: String,
  pub cost: Decimal,
}

impl Default for ShippingMethod {
  fn default() -> Self {
    Self {
      kind: "Standard".to_string(),
      cost: Decimal::ZERO,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coupon {
  pub code: String,
  pub discount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstDetails {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gst_number: Option<String>,
  #[serde(default)]
  pub state: String,
  #[serde(default)]
  pub city: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
  #[default]
  #[serde(rename = "COD")]
  CashOnDelivery,
  Razorpay,
}

impl PaymentMethod {
  pub fn uses_gateway(self) -> bool {
    matches!(self, PaymentMethod::Razorpay)
  }
}

/// Everything the customer enters across the Information and Payment steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFormData {
  pub customer: Customer,
  pub shipping_address: ShippingAddress,
  #[serde(default)]
  pub shipping_method: ShippingMethod,
  #[serde(default)]
  pub coupon: Coupon,
  #[serde(default)]
  pub gst_details: GstDetails,
  #[serde(default)]
  pub payment_method: PaymentMethod,
}
