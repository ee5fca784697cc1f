// storefront_client/src/checkout/step.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CheckoutStep {
  #[default]
  Information,
  Payment,
  Confirmation,
}

impl CheckoutStep {
  /// 1-based position shown in the step indicator.
  pub fn number(self) -> u8 {
    match self {
      CheckoutStep::Information => 1,
      CheckoutStep::Payment => 2,
      CheckoutStep::Confirmation => 3,
    }
  }

  pub fn is_terminal(self) -> bool {
    self == CheckoutStep::Confirmation
  }
}

impl fmt::Display for CheckoutStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      CheckoutStep::Information => "Information",
      CheckoutStep::Payment => "Payment",
      CheckoutStep::Confirmation => "Confirmation",
    };
    write!(f, "{}", label)
  }
}
