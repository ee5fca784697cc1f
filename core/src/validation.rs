// storefront_client/src/validation.rs

//! Synchronous checks gating the Information → Payment transition.
//!
//! Every check runs locally; a failure is reported as a [`ValidationError`]
//! naming the first offending field, in the order the form presents them.

use crate::models::{CartItem, CheckoutFormData};
use crate::pricing::{checked_subtotal, PricingSnapshot};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+(?: [A-Za-z]+)*$").expect("valid name regex"));
static EMAIL_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").expect("valid phone regex"));
static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid pincode regex"));
// 2-digit state code, PAN (5 letters, 4 digits, 1 letter), entity code, 'Z', checksum.
static GSTIN_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\d{2}[A-Z]{5}\d{4}[A-Z][A-Z\d]Z[A-Z\d]$").expect("valid gstin regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  Cart,
  FirstName,
  LastName,
  Email,
  Phone,
  Address1,
  City,
  State,
  Pincode,
  Country,
  GstNumber,
  Total,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
  pub field: FormField,
  pub message: String,
}

impl ValidationError {
  fn new(field: FormField, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

pub fn is_valid_name(value: &str) -> bool {
  NAME_RE.is_match(value.trim())
}

pub fn is_valid_email(value: &str) -> bool {
  EMAIL_RE.is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
  PHONE_RE.is_match(value.trim())
}

pub fn is_valid_pincode(value: &str) -> bool {
  PINCODE_RE.is_match(value.trim())
}

pub fn is_valid_gstin(value: &str) -> bool {
  GSTIN_RE.is_match(value.trim())
}

fn require(value: &str, field: FormField, label: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::new(field, format!("{} is required", label)));
  }
  Ok(())
}

/// Validates the Information step. Returns the first failing gate.
pub fn validate_information(
  form: &CheckoutFormData,
  items: &[CartItem],
  pricing: &PricingSnapshot,
) -> Result<(), ValidationError> {
  if items.iter().all(|item| item.quantity == 0) {
    return Err(ValidationError::new(FormField::Cart, "Your cart is empty"));
  }
  if items.iter().any(|item| item.quantity == 0) {
    return Err(ValidationError::new(
      FormField::Cart,
      "Every cart item needs a quantity of at least 1",
    ));
  }
  if checked_subtotal(items).is_none() {
    return Err(ValidationError::new(FormField::Cart, "Your cart total is too large"));
  }

  let customer = &form.customer;
  require(&customer.first_name, FormField::FirstName, "First name")?;
  if !is_valid_name(&customer.first_name) {
    return Err(ValidationError::new(
      FormField::FirstName,
      "First name may only contain letters",
    ));
  }
  require(&customer.last_name, FormField::LastName, "Last name")?;
  if !is_valid_name(&customer.last_name) {
    return Err(ValidationError::new(
      FormField::LastName,
      "Last name may only contain letters",
    ));
  }
  if !is_valid_email(&customer.email) {
    return Err(ValidationError::new(FormField::Email, "Please enter a valid email address"));
  }
  if !is_valid_phone(&customer.phone) {
    return Err(ValidationError::new(
      FormField::Phone,
      "Phone number must be exactly 10 digits",
    ));
  }

  let address = &form.shipping_address;
  require(&address.address1, FormField::Address1, "Address")?;
  require(&address.city, FormField::City, "City")?;
  require(&address.state, FormField::State, "State")?;
  require(&address.country, FormField::Country, "Country")?;
  if !is_valid_pincode(&address.pincode) {
    return Err(ValidationError::new(FormField::Pincode, "Pincode must be exactly 6 digits"));
  }

  if let Some(gst) = form.gst_details.gst_number.as_deref() {
    if !gst.trim().is_empty() && !is_valid_gstin(gst) {
      return Err(ValidationError::new(
        FormField::GstNumber,
        "Please enter a valid 15-character GST number",
      ));
    }
  }

  if pricing.total < Decimal::ONE {
    return Err(ValidationError::new(FormField::Total, "Order total must be at least ₹1"));
  }
  Ok(())
}
