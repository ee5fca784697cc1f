// apps/storefront_console/src/main.rs

mod cli;
mod console;

use crate::cli::{CheckoutArgs, Cli, Commands};
use crate::console::{print_flow_error, print_order, ConsoleRedirect, ConsoleView};

use anyhow::{bail, Context};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storefront_client::models::{CartItem, CheckoutFormData, Order};
use storefront_client::{
  CheckoutFlow, CheckoutServices, Debouncer, FeedStatus, FileStore, FreeShippingCoupon, LiveOrderFeed,
  ReqwestEventStream, ReqwestTransport, ResilientApiClient, SessionStore, StorefrontConfig, SubmitOutcome,
  UnavailableWidget,
};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let config = StorefrontConfig::from_env().context("Failed to load storefront configuration")?;
  let session = SessionStore::new(Arc::new(FileStore::open(&config.session_store_path)?));

  match cli.command {
    Commands::Login { token } => {
      session.set_auth_token(token.trim())?;
      session.clear_csrf_token()?;
      println!("Signed in.");
    }
    Commands::Logout => {
      session.clear_auth()?;
      println!("Signed out.");
    }
    Commands::Cart { file } => {
      let items: Vec<CartItem> = read_json(&file)?;
      session.save_cart(&items)?;
      println!("Cart saved with {} item(s).", items.len());
    }
    Commands::Checkout(args) => checkout(&config, session, args).await?,
    Commands::Resume { cancel, yes } => resume(&config, session, cancel, yes).await?,
    Commands::WatchOrders { render_delay_ms } => {
      watch_orders(&config, session, Duration::from_millis(render_delay_ms)).await?
    }
  }
  Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
  let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn api_client(config: &StorefrontConfig, session: SessionStore) -> anyhow::Result<ResilientApiClient> {
  let transport = ReqwestTransport::new(config.api_base_url.clone(), config.request_timeout)?;
  Ok(ResilientApiClient::new(
    Arc::new(transport),
    session,
    config.retry,
    Arc::new(ConsoleRedirect),
  ))
}

// No browser to host the payment widget, so gateway payments stay pending
// until they are resumed from the storefront.
fn checkout_flow(config: &StorefrontConfig, session: SessionStore, assume_yes: bool) -> anyhow::Result<CheckoutFlow> {
  let api = api_client(config, session)?;
  let services = CheckoutServices::new(api, Arc::new(UnavailableWidget), config.gateway.clone());
  Ok(CheckoutFlow::from_saved_cart(
    services,
    Arc::new(ConsoleView { assume_yes }),
    Arc::new(FreeShippingCoupon),
  ))
}

async fn checkout(config: &StorefrontConfig, session: SessionStore, args: CheckoutArgs) -> anyhow::Result<()> {
  let form: CheckoutFormData = read_json(&args.form)?;
  let flow = checkout_flow(config, session, false)?;
  if flow.items().is_empty() {
    bail!("The saved cart is empty. Run `storefront-console cart --file <items.json>` first.");
  }

  flow.update_form(|current| *current = form);
  if flow.submit_information().is_err() {
    print_flow_error(&flow);
    bail!("Checkout details are incomplete.");
  }

  flow.select_payment_method(args.method.into());
  if let Some(code) = args.coupon.as_deref() {
    if !flow.apply_coupon(code) {
      print_flow_error(&flow);
    }
  }
  let pricing = flow.pricing();
  println!(
    "Subtotal {}  Shipping {}  Discount {}  Total {}",
    pricing.subtotal, pricing.shipping_cost, pricing.coupon_discount, pricing.total
  );
  report_submission(&flow, flow.submit_payment().await)
}

async fn resume(config: &StorefrontConfig, session: SessionStore, cancel: bool, yes: bool) -> anyhow::Result<()> {
  let flow = checkout_flow(config, session, yes)?;
  let resumed = match flow.resume_pending().await {
    Ok(Some(order)) => order,
    Ok(None) => {
      println!("No unfinished payment.");
      return Ok(());
    }
    Err(e) => {
      print_flow_error(&flow);
      return Err(e.into());
    }
  };
  print_order(&resumed);

  if cancel {
    match flow.cancel_pending_order().await {
      Ok(true) => println!("Order #{} cancelled.", resumed.order_id),
      Ok(false) => println!("Order #{} kept.", resumed.order_id),
      Err(e) => {
        print_flow_error(&flow);
        return Err(e.into());
      }
    }
    return Ok(());
  }
  report_submission(&flow, flow.retry_payment().await)
}

fn report_submission(
  flow: &CheckoutFlow,
  outcome: storefront_client::StorefrontResult<SubmitOutcome>,
) -> anyhow::Result<()> {
  match outcome {
    Ok(SubmitOutcome::Confirmed(order)) => {
      println!("Order confirmed.");
      print_order(&order);
    }
    Ok(SubmitOutcome::AwaitingPayment(order)) => {
      print_order(&order);
      print_flow_error(flow);
    }
    Ok(SubmitOutcome::Ignored) | Ok(SubmitOutcome::Superseded) => println!("Nothing was submitted."),
    Err(e) => {
      print_flow_error(flow);
      return Err(e.into());
    }
  }
  Ok(())
}

async fn watch_orders(config: &StorefrontConfig, session: SessionStore, render_delay: Duration) -> anyhow::Result<()> {
  let api = api_client(config, session)?;
  let connector = ReqwestEventStream::new(config.api_base_url.clone(), config.request_timeout)?;
  let feed = Arc::new(LiveOrderFeed::new(api, Arc::new(connector), config.feed));

  for order in feed.manual_refresh().await? {
    print_order(&order);
  }

  let renderer = Debouncer::new(render_delay, |orders: Vec<Order>| async move {
    println!("---- {} order(s) ----", orders.len());
    orders.iter().for_each(print_order);
  });

  let mut status = feed.subscribe();
  let runner = tokio::spawn({
    let feed = feed.clone();
    async move { feed.run().await }
  });
  tokio::pin!(runner);

  let mut last_seen = feed.orders();
  let mut ticker = tokio::time::interval(render_delay);
  let result = loop {
    tokio::select! {
      changed = status.changed() => {
        if changed.is_err() {
          continue;
        }
        let current = *status.borrow_and_update();
        match current {
          FeedStatus::Connected => eprintln!("Live updates connected."),
          FeedStatus::Reconnecting { attempt, delay } => eprintln!("Reconnecting (attempt {}) in {:?}.", attempt, delay),
          FeedStatus::SessionExpired => eprintln!("The server refused the session."),
          FeedStatus::ManualRefreshOnly | FeedStatus::Connecting => {
            if let Some(notice) = feed.notice() {
              eprintln!("{}", notice);
            }
          }
        }
      }
      _ = ticker.tick() => {
        let orders = feed.orders();
        if orders != last_seen {
          renderer.trigger(orders.clone());
          last_seen = orders;
        }
      }
      joined = &mut runner => break joined,
      _ = tokio::signal::ctrl_c() => {
        runner.abort();
        break Ok(Ok(()));
      }
    }
  };
  renderer.close().await;

  match result {
    Ok(Ok(())) if feed.status() == FeedStatus::ManualRefreshOnly => {
      let orders = feed.manual_refresh().await?;
      println!("---- {} order(s), refreshed manually ----", orders.len());
      orders.iter().for_each(print_order);
      Ok(())
    }
    Ok(Ok(())) => Ok(()),
    Ok(Err(e)) => Err(e.into()),
    Err(join) => bail!("order feed task failed: {}", join),
  }
}
