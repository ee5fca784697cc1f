// apps/storefront_console/src/cli.rs
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storefront_client::models::PaymentMethod;

#[derive(Debug, Parser)]
#[command(name = "storefront-console", about = "Storefront checkout and order console")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Store a bearer token for later calls.
  Login {
    #[arg(long)]
    token: String,
  },
  /// Forget the bearer token and CSRF token.
  Logout,
  /// Replace the saved cart with the items in a JSON file.
  Cart {
    #[arg(long)]
    file: PathBuf,
  },
  /// Run the checkout for the saved cart.
  Checkout(CheckoutArgs),
  /// Recover a payment left pending by an earlier session.
  Resume {
    /// Cancel the pending order instead of keeping it.
    #[arg(long)]
    cancel: bool,
    /// Skip the confirmation prompt when cancelling.
    #[arg(long)]
    yes: bool,
  },
  /// Follow live order updates.
  WatchOrders {
    /// Quiet period before the order list is re-printed, in milliseconds.
    #[arg(long, default_value_t = 500)]
    render_delay_ms: u64,
  },
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
  /// JSON file with the customer, shipping address and optional GST details.
  #[arg(long)]
  pub form: PathBuf,
  #[arg(long, value_enum, default_value_t = MethodArg::Cod)]
  pub method: MethodArg,
  #[arg(long)]
  pub coupon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
  Cod,
  Razorpay,
}

impl From<MethodArg> for PaymentMethod {
  fn from(arg: MethodArg) -> Self {
    match arg {
      MethodArg::Cod => PaymentMethod::CashOnDelivery,
      MethodArg::Razorpay => PaymentMethod::Razorpay,
    }
  }
}
