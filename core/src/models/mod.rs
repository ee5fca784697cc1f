// storefront_client/src/models/mod.rs

//! Wire and domain types shared by the checkout, payment and feed modules.

pub mod cart_item;
pub mod checkout_form;
pub mod order;
pub mod pending;

pub use cart_item::CartItem;
pub use checkout_form::{
  CheckoutFormData, Coupon, Customer, GstDetails, PaymentMethod, ShippingAddress, ShippingMethod,
};
pub use order::{Order, OrderSubmission, PaymentStatus};
pub use pending::PendingTransaction;
