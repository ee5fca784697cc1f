// apps/storefront_console/src/console.rs
use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use storefront_client::checkout::{CheckoutStep, CheckoutView, ErrorBanner, RecoveryAction};
use storefront_client::models::Order;
use storefront_client::{CheckoutFlow, LoginRedirect};

/// Terminal rendition of the checkout screen.
pub struct ConsoleView {
  /// Answer every confirmation with yes.
  pub assume_yes: bool,
}

#[async_trait]
impl CheckoutView for ConsoleView {
  fn step_changed(&self, step: CheckoutStep) {
    println!("== Step {}: {} ==", step.number(), step);
  }

  async fn confirm(&self, prompt: &str) -> bool {
    if self.assume_yes {
      return true;
    }
    let prompt = prompt.to_string();
    let answer = tokio::task::spawn_blocking(move || {
      print!("{} [y/N] ", prompt);
      io::stdout().flush().ok();
      let mut line = String::new();
      io::stdin().lock().read_line(&mut line).ok();
      line
    })
    .await
    .unwrap_or_default();
    matches!(answer.trim(), "y" | "Y" | "yes")
  }
}

pub struct ConsoleRedirect;

impl LoginRedirect for ConsoleRedirect {
  fn redirect_to_login(&self) {
    eprintln!("Your session has expired. Run `storefront-console login --token <token>` to sign in again.");
  }
}

pub fn print_banner(banner: &ErrorBanner) {
  eprintln!("! {}", banner.message);
  for action in &banner.actions {
    let hint = match action {
      RecoveryAction::RetryPayment => "retry the payment: storefront-console resume",
      RecoveryAction::CancelPendingOrder => "cancel the order: storefront-console resume --cancel",
      RecoveryAction::SwitchToCashOnDelivery => "pay on delivery: storefront-console checkout --method cod",
      RecoveryAction::SignIn => "sign in: storefront-console login --token <token>",
    };
    eprintln!("  - {}", hint);
  }
}

pub fn print_flow_error(flow: &CheckoutFlow) {
  if let Some(banner) = flow.error() {
    print_banner(&banner);
  }
}

pub fn print_order(order: &Order) {
  let status = format!("{:?}", order.payment_status);
  println!(
    "#{}  {:<8}  {:>10}  {}",
    order.order_id,
    status,
    order.total.to_string(),
    order.customer.full_name()
  );
}
