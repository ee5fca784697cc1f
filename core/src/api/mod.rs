// storefront_client/src/api/mod.rs

//! The resilient REST client and its layers.
//!
//! A call travels `ResilientApiClient::send` → CSRF refresh-once wrapper →
//! backoff wrapper → `HttpTransport`. The two wrappers are independent so
//! each can be exercised on its own.

pub mod client;
pub mod csrf;
pub mod orders;
pub mod retry;
pub mod transport;

pub use client::{LoginRedirect, NoopRedirect, ResilientApiClient};
pub use csrf::CsrfGuard;
pub use orders::{GatewayHandle, VerificationResult, VerifyPaymentRequest};
pub use retry::{with_backoff, RetryConfig};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, TransportError};
