// src/lib.rs

//! Storefront client: the customer checkout, gateway payments, and the admin
//! live order feed, over a resilient REST client.
//!
//!  - `checkout`: the Information → Payment → Confirmation state machine. Order
//!    submission runs as a named-step pipeline.
//!  - `payment`: one gateway payment per order, with recovery of payments left
//!    pending by an earlier session.
//!  - `api`: CSRF attach and refresh-once, bounded backoff for transient
//!    failures, session expiry handling, typed order endpoints.
//!  - `feed`: server-sent order events with bounded reconnects and a manual
//!    refresh fallback.
//!  - `store`: the client-side persisted state (auth token, CSRF token, pending
//!    payment, cart) behind a swappable key/value trait.

pub mod api;
pub mod checkout;
pub mod config;
pub mod core;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod models;
pub mod payment;
pub mod pipeline;
pub mod pricing;
pub mod store;
pub mod validation;

pub use crate::api::{
  ApiRequest, ApiResponse, HttpTransport, LoginRedirect, NoopRedirect, ReqwestTransport, ResilientApiClient, RetryConfig,
  TransportError,
};
pub use crate::checkout::{
  CheckoutFlow, CheckoutServices, CheckoutState, CheckoutStep, CheckoutView, ErrorBanner, RecoveryAction, SubmitOutcome,
};
pub use crate::config::StorefrontConfig;
pub use crate::core::{PipelineControl, PipelineResult, SharedState};
pub use crate::debounce::Debouncer;
pub use crate::error::{StorefrontError, StorefrontResult};
pub use crate::feed::{EventStreamConnector, FeedConfig, FeedStatus, LiveOrderFeed, ReqwestEventStream};
pub use crate::payment::{
  GatewaySettings, PaymentGatewaySession, PaymentResolution, PaymentWidget, UnavailableWidget, WidgetConfig,
  WidgetOutcome,
};
pub use crate::pipeline::Pipeline;
pub use crate::pricing::{CouponEffect, CouponValidator, FreeShippingCoupon, PricingSnapshot};
pub use crate::store::{ClientStore, FileStore, MemoryStore, SessionStore};
pub use crate::validation::{FormField, ValidationError};
