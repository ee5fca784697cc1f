// storefront_client/src/payment/mod.rs

//! Gateway payments for storefront orders.

pub mod session;
pub mod widget;

pub use session::{GatewaySettings, PaymentGatewaySession, PaymentResolution, UnresolvedReason};
pub use widget::{
  GatewayFailure, GatewayPaymentResponse, PaymentWidget, UnavailableWidget, WidgetConfig, WidgetOutcome, WidgetPrefill,
  WidgetTheme,
};
