// storefront_client/src/checkout/view.rs
use super::step::CheckoutStep;
use async_trait::async_trait;

/// The presentation side of the checkout. The flow calls it for side effects
/// it cannot perform itself.
#[async_trait]
pub trait CheckoutView: Send + Sync {
  /// An error banner was just set.
  fn scroll_to_error(&self) {}

  fn step_changed(&self, _step: CheckoutStep) {}

  /// Modal confirmation for destructive actions. `true` means the user agreed.
  async fn confirm(&self, prompt: &str) -> bool;
}
