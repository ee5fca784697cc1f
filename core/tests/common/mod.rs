// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront_client::api::{ApiRequest, ApiResponse, HttpTransport, LoginRedirect, ResilientApiClient, RetryConfig, TransportError};
use storefront_client::checkout::{CheckoutFlow, CheckoutServices, CheckoutStep, CheckoutView};
use storefront_client::models::{CartItem, CheckoutFormData, PaymentMethod};
use storefront_client::payment::{GatewayPaymentResponse, GatewaySettings, PaymentWidget, WidgetConfig, WidgetOutcome};
use storefront_client::pricing::FreeShippingCoupon;
use storefront_client::store::SessionStore;
use tokio::sync::Notify;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const CSRF_PATH: &str = "/api/csrf-token";

type Reply = Result<ApiResponse, TransportError>;

/// Scripted `HttpTransport`. Replies are queued per `(method, path)`; once a
/// queue is empty its fallback (if any) answers, otherwise a 599 is returned
/// so a missing script shows up in assertions. The CSRF issuer answers with
/// `csrf-<n>` by default.
#[derive(Default)]
pub struct FakeTransport {
  queues: Mutex<HashMap<(String, String), VecDeque<Reply>>>,
  fallbacks: Mutex<HashMap<(String, String), Reply>>,
  requests: Mutex<Vec<ApiRequest>>,
  csrf_issued: AtomicUsize,
}

fn key(method: &str, path: &str) -> (String, String) {
  (method.to_ascii_uppercase(), path.to_string())
}

impl FakeTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn reply(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
    self.push(method, path, Ok(ApiResponse::new(status, body)))
  }

  pub fn fail(&self, method: &str, path: &str, error: TransportError) -> &Self {
    self.push(method, path, Err(error))
  }

  pub fn always(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
    self
      .fallbacks
      .lock()
      .insert(key(method, path), Ok(ApiResponse::new(status, body)));
    self
  }

  fn push(&self, method: &str, path: &str, reply: Reply) -> &Self {
    self.queues.lock().entry(key(method, path)).or_default().push_back(reply);
    self
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.requests.lock().clone()
  }

  pub fn calls(&self, method: &str, path: &str) -> Vec<ApiRequest> {
    self
      .requests()
      .into_iter()
      .filter(|r| r.method.as_str().eq_ignore_ascii_case(method) && r.path == path)
      .collect()
  }

  pub fn count(&self, method: &str, path: &str) -> usize {
    self.calls(method, path).len()
  }

  pub fn csrf_fetches(&self) -> usize {
    self.count("GET", CSRF_PATH)
  }
}

#[async_trait]
impl HttpTransport for FakeTransport {
  async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
    let k = key(request.method.as_str(), &request.path);
    self.requests.lock().push(request);

    if let Some(reply) = self.queues.lock().get_mut(&k).and_then(VecDeque::pop_front) {
      return reply;
    }
    if let Some(reply) = self.fallbacks.lock().get(&k).cloned() {
      return reply;
    }
    if k.1 == CSRF_PATH {
      let n = self.csrf_issued.fetch_add(1, Ordering::SeqCst) + 1;
      return Ok(ApiResponse::new(200, json!({ "csrfToken": format!("csrf-{}", n) })));
    }
    Ok(ApiResponse::new(599, json!({ "message": format!("unscripted {} {}", k.0, k.1) })))
  }
}

#[derive(Default)]
pub struct RecordingRedirect {
  pub count: AtomicUsize,
}

impl RecordingRedirect {
  pub fn redirects(&self) -> usize {
    self.count.load(Ordering::SeqCst)
  }
}

impl LoginRedirect for RecordingRedirect {
  fn redirect_to_login(&self) {
    self.count.fetch_add(1, Ordering::SeqCst);
  }
}

/// Widget that replays scripted outcomes and records every config it was opened with.
pub struct FakeWidget {
  loaded: bool,
  gate: Option<Arc<Notify>>,
  outcomes: Mutex<VecDeque<WidgetOutcome>>,
  pub opened: Mutex<Vec<WidgetConfig>>,
}

impl FakeWidget {
  pub fn loaded() -> Arc<Self> {
    Arc::new(Self {
      loaded: true,
      gate: None,
      outcomes: Mutex::new(VecDeque::new()),
      opened: Mutex::new(Vec::new()),
    })
  }

  pub fn not_loaded() -> Arc<Self> {
    Arc::new(Self {
      loaded: false,
      gate: None,
      outcomes: Mutex::new(VecDeque::new()),
      opened: Mutex::new(Vec::new()),
    })
  }

  /// A widget that stays open until `gate` is notified, like a user taking their time.
  pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
    Arc::new(Self {
      loaded: true,
      gate: Some(gate),
      outcomes: Mutex::new(VecDeque::new()),
      opened: Mutex::new(Vec::new()),
    })
  }

  pub fn will(&self, outcome: WidgetOutcome) -> &Self {
    self.outcomes.lock().push_back(outcome);
    self
  }

  pub fn open_count(&self) -> usize {
    self.opened.lock().len()
  }
}

#[async_trait]
impl PaymentWidget for FakeWidget {
  fn is_loaded(&self) -> bool {
    self.loaded
  }

  async fn open(&self, config: WidgetConfig) -> WidgetOutcome {
    self.opened.lock().push(config);
    if let Some(gate) = &self.gate {
      gate.notified().await;
    }
    self.outcomes.lock().pop_front().unwrap_or(WidgetOutcome::Dismissed)
  }
}

pub struct RecordingView {
  pub scrolls: AtomicUsize,
  pub steps: Mutex<Vec<CheckoutStep>>,
  pub prompts: Mutex<Vec<String>>,
  answer: bool,
}

impl RecordingView {
  pub fn answering(answer: bool) -> Arc<Self> {
    Arc::new(Self {
      scrolls: AtomicUsize::new(0),
      steps: Mutex::new(Vec::new()),
      prompts: Mutex::new(Vec::new()),
      answer,
    })
  }

  pub fn scroll_count(&self) -> usize {
    self.scrolls.load(Ordering::SeqCst)
  }

  pub fn steps(&self) -> Vec<CheckoutStep> {
    self.steps.lock().clone()
  }
}

#[async_trait]
impl CheckoutView for RecordingView {
  fn scroll_to_error(&self) {
    self.scrolls.fetch_add(1, Ordering::SeqCst);
  }

  fn step_changed(&self, step: CheckoutStep) {
    self.steps.lock().push(step);
  }

  async fn confirm(&self, prompt: &str) -> bool {
    self.prompts.lock().push(prompt.to_string());
    self.answer
  }
}

pub fn fast_retry() -> RetryConfig {
  RetryConfig {
    max_attempts: 3,
    base_delay: Duration::from_millis(1),
  }
}

pub fn cart_items() -> Vec<CartItem> {
  vec![CartItem {
    id: "1".to_string(),
    name: "Notebook".to_string(),
    price: Decimal::from(100),
    quantity: 2,
    variant: None,
  }]
}

pub fn valid_form() -> CheckoutFormData {
  let mut form = CheckoutFormData::default();
  form.customer.first_name = "John".to_string();
  form.customer.last_name = "Doe".to_string();
  form.customer.email = "john@example.com".to_string();
  form.customer.phone = "9876543210".to_string();
  form.shipping_address.address1 = "12 MG Road".to_string();
  form.shipping_address.city = "Bengaluru".to_string();
  form.shipping_address.state = "Karnataka".to_string();
  form.shipping_address.pincode = "560001".to_string();
  form
}

pub fn order_json(order_id: &str, status: &str, total: u32) -> Value {
  let method = if status == "Pending" { "Razorpay" } else { "COD" };
  json!({
    "orderId": order_id,
    "customer": {
      "firstName": "John",
      "lastName": "Doe",
      "email": "john@example.com",
      "phone": "9876543210"
    },
    "items": [{ "id": 1, "name": "Notebook", "price": 100, "quantity": 2 }],
    "total": total,
    "paymentMethod": method,
    "paymentStatus": status
  })
}

pub fn gateway_success(gateway_order_id: &str) -> WidgetOutcome {
  WidgetOutcome::Succeeded(GatewayPaymentResponse {
    razorpay_payment_id: "pay_1".to_string(),
    razorpay_order_id: gateway_order_id.to_string(),
    razorpay_signature: "sig".to_string(),
  })
}

/// Everything a checkout test needs, wired against fakes.
pub struct Harness {
  pub transport: Arc<FakeTransport>,
  pub session: SessionStore,
  pub redirect: Arc<RecordingRedirect>,
  pub widget: Arc<FakeWidget>,
  pub view: Arc<RecordingView>,
  pub api: ResilientApiClient,
  pub services: CheckoutServices,
}

impl Harness {
  pub fn new() -> Self {
    Self::with_widget(FakeWidget::loaded(), RecordingView::answering(true))
  }

  pub fn with_widget(widget: Arc<FakeWidget>, view: Arc<RecordingView>) -> Self {
    setup_tracing();
    let transport = FakeTransport::new();
    let session = SessionStore::in_memory();
    session.set_auth_token("auth-1").unwrap();
    let redirect = Arc::new(RecordingRedirect::default());
    let api = ResilientApiClient::new(transport.clone(), session.clone(), fast_retry(), redirect.clone());
    let services = CheckoutServices::new(api.clone(), widget.clone(), GatewaySettings::default());
    Self {
      transport,
      session,
      redirect,
      widget,
      view,
      api,
      services,
    }
  }

  pub fn flow(&self) -> CheckoutFlow {
    self.flow_with(cart_items())
  }

  pub fn flow_with(&self, items: Vec<CartItem>) -> CheckoutFlow {
    CheckoutFlow::new(items, self.services.clone(), self.view.clone(), Arc::new(FreeShippingCoupon))
  }

  /// A flow already past the Information step with a valid form.
  pub fn flow_on_payment(&self, method: PaymentMethod) -> CheckoutFlow {
    let flow = self.flow();
    flow.update_form(|form| *form = valid_form());
    flow.submit_information().unwrap();
    assert!(flow.select_payment_method(method));
    flow
  }
}
