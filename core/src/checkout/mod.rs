// storefront_client/src/checkout/mod.rs

//! The three-step checkout: Information → Payment → Confirmation.

pub mod flow;
pub mod state;
pub mod step;
pub mod submission;
pub mod view;

pub use flow::{CheckoutFlow, SubmitOutcome};
pub use state::{CheckoutState, ErrorBanner, RecoveryAction};
pub use step::CheckoutStep;
pub use view::CheckoutView;

use crate::api::ResilientApiClient;
use crate::payment::{GatewaySettings, PaymentGatewaySession, PaymentWidget};
use crate::store::SessionStore;
use std::sync::Arc;

/// Collaborators the checkout depends on.
#[derive(Clone)]
pub struct CheckoutServices {
  pub api: ResilientApiClient,
  pub payments: Arc<PaymentGatewaySession>,
  pub session: SessionStore,
}

impl CheckoutServices {
  pub fn new(api: ResilientApiClient, widget: Arc<dyn PaymentWidget>, settings: GatewaySettings) -> Self {
    let session = api.session().clone();
    let payments = Arc::new(PaymentGatewaySession::new(api.clone(), widget, settings));
    Self {
      api,
      payments,
      session,
    }
  }
}
