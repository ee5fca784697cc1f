// storefront_client/src/pricing.rs

//! Derived pricing for the checkout: shipping tiers, coupons and the payable total.

use crate::models::CartItem;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const FREE_SHIPPING_THRESHOLD: Decimal = dec!(800);
pub const REDUCED_SHIPPING_THRESHOLD: Decimal = dec!(500);
pub const REDUCED_SHIPPING_COST: Decimal = dec!(50);
pub const STANDARD_SHIPPING_COST: Decimal = dec!(80);
/// The smallest payable total, in rupees.
pub const MINIMUM_TOTAL: Decimal = Decimal::ONE;

pub const FREE_SHIPPING_CODE: &str = "FREESHIPPING";

/// Shipping cost for a subtotal before any coupon.
pub fn shipping_cost(subtotal: Decimal) -> Decimal {
  if subtotal >= FREE_SHIPPING_THRESHOLD {
    Decimal::ZERO
  } else if subtotal >= REDUCED_SHIPPING_THRESHOLD {
    REDUCED_SHIPPING_COST
  } else {
    STANDARD_SHIPPING_COST
  }
}

/// `None` when the cart's amounts overflow.
pub fn checked_subtotal(items: &[CartItem]) -> Option<Decimal> {
  items
    .iter()
    .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
}

/// Saturates at `Decimal::MAX`; validation rejects such carts.
pub fn subtotal(items: &[CartItem]) -> Decimal {
  checked_subtotal(items).unwrap_or(Decimal::MAX)
}

/// What an accepted coupon does to the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponEffect {
  /// Shipping drops to zero and the tier cost is booked as the discount.
  FreeShipping,
  FlatDiscount(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
  pub code: String,
  pub effect: CouponEffect,
}

/// Decides whether a coupon code is accepted.
pub trait CouponValidator: Send + Sync {
  /// `code` is already trimmed and upper-cased. `None` rejects the code.
  fn validate(&self, code: &str, subtotal: Decimal) -> Option<CouponEffect>;
}

/// The storefront's only coupon today: `FREESHIPPING`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeShippingCoupon;

impl CouponValidator for FreeShippingCoupon {
  fn validate(&self, code: &str, _subtotal: Decimal) -> Option<CouponEffect> {
    (code == FREE_SHIPPING_CODE).then_some(CouponEffect::FreeShipping)
  }
}

pub fn normalize_coupon_code(code: &str) -> String {
  code.trim().to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingSnapshot {
  pub subtotal: Decimal,
  pub shipping_cost: Decimal,
  pub coupon_discount: Decimal,
  pub total: Decimal,
}

impl PricingSnapshot {
  /// `total = max(1, subtotal + shipping_cost - coupon_discount)`.
  pub fn compute(subtotal: Decimal, coupon: Option<CouponEffect>) -> Self {
    let tier_cost = shipping_cost(subtotal);
    let (shipping_cost, coupon_discount) = match coupon {
      None => (tier_cost, Decimal::ZERO),
      Some(CouponEffect::FreeShipping) => (Decimal::ZERO, tier_cost),
      Some(CouponEffect::FlatDiscount(amount)) => (tier_cost, amount.max(Decimal::ZERO)),
    };
    let total = subtotal
      .checked_add(shipping_cost)
      .and_then(|gross| gross.checked_sub(coupon_discount))
      .unwrap_or(Decimal::MAX)
      .max(MINIMUM_TOTAL);
    Self {
      subtotal,
      shipping_cost,
      coupon_discount,
      total,
    }
  }

  pub fn for_items(items: &[CartItem], coupon: Option<CouponEffect>) -> Self {
    Self::compute(subtotal(items), coupon)
  }

  /// Total in paise, as the payment widget expects.
  pub fn total_minor_units(&self) -> i64 {
    to_minor_units(self.total)
  }
}

pub fn to_minor_units(amount: Decimal) -> i64 {
  amount
    .checked_mul(dec!(100))
    .and_then(|minor| minor.round().to_i64())
    .unwrap_or(i64::MAX)
}
