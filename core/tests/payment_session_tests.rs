// tests/payment_session_tests.rs
mod common;

use common::*;
use serde_json::json;
use serial_test::serial;
use storefront_client::models::{Order, PaymentStatus, PendingTransaction};
use storefront_client::payment::{GatewayFailure, PaymentResolution, UnresolvedReason, WidgetOutcome};
use storefront_client::StorefrontError;

const INITIATE: &str = "/api/orders/initiate-razorpay-payment";
const VERIFY: &str = "/api/orders/verify-razorpay-payment";
const PENDING: &str = "/api/orders/pending/ord_1";

fn pending_order() -> Order {
  serde_json::from_value(order_json("ord_1", "Pending", 280)).unwrap()
}

fn initiated(h: &Harness) {
  h.transport.reply(
    "POST",
    INITIATE,
    200,
    json!({ "razorpayOrderId": "rzp_1", "keyId": "key_1", "orderData": { "amount": 28000 } }),
  );
}

#[tokio::test]
#[serial]
async fn initiate_persists_the_pending_transaction() {
  let h = Harness::new();
  initiated(&h);

  let handle = h.services.payments.initiate("ord_1").await.unwrap();

  assert_eq!(handle.gateway_order_id, "rzp_1");
  let stored = h.services.payments.stored_pending().unwrap();
  assert_eq!(stored.order_id, "ord_1");
  assert_eq!(stored.razorpay_order_id, "rzp_1");
}

#[tokio::test]
#[serial]
async fn gateway_init_failure_leaves_no_pending_record() {
  let h = Harness::new();
  h.transport.reply("POST", INITIATE, 200, json!({ "keyId": "key_1" }));

  let err = h.services.payments.initiate("ord_1").await.unwrap_err();

  assert!(matches!(err, StorefrontError::GatewayInit(_)));
  assert!(err.is_payment_retryable());
  assert_eq!(h.services.payments.stored_pending(), None);
}

#[tokio::test]
#[serial]
async fn widget_config_carries_amount_prefill_and_notes() {
  let h = Harness::new();
  initiated(&h);
  let handle = h.services.payments.initiate("ord_1").await.unwrap();
  h.widget.will(WidgetOutcome::Dismissed);

  h.services.payments.open(&handle, &pending_order()).await.unwrap();

  let config = h.widget.opened.lock()[0].clone();
  assert_eq!(config.key, "key_1");
  assert_eq!(config.amount, 28000);
  assert_eq!(config.currency, "INR");
  assert_eq!(config.order_id, "rzp_1");
  assert_eq!(config.prefill.name, "John Doe");
  assert_eq!(config.prefill.contact, "9876543210");
  assert_eq!(config.notes.get("orderId").map(String::as_str), Some("ord_1"));
  assert_eq!(config.theme.color, "#3399cc");
}

#[tokio::test]
#[serial]
async fn unloaded_widget_fails_fast() {
  let h = Harness::with_widget(FakeWidget::not_loaded(), RecordingView::answering(true));
  initiated(&h);
  let handle = h.services.payments.initiate("ord_1").await.unwrap();

  let err = h.services.payments.open(&handle, &pending_order()).await.unwrap_err();

  assert!(matches!(err, StorefrontError::GatewayUnavailable));
  assert!(err.user_message().contains("Cash on Delivery"));
}

#[tokio::test]
#[serial]
async fn verified_payment_clears_pending_and_cart() {
  let h = Harness::new();
  h.session.save_cart(&cart_items()).unwrap();
  h.session
    .save_pending_transaction(&PendingTransaction::new("ord_1", "rzp_1"))
    .unwrap();
  h.transport
    .reply("POST", VERIFY, 200, json!({ "success": true, "order": order_json("ord_1", "Paid", 280) }));

  let resolution = h
    .services
    .payments
    .resolve(&pending_order(), gateway_success("rzp_1"))
    .await
    .unwrap();

  match resolution {
    PaymentResolution::Verified(order) => assert_eq!(order.payment_status, PaymentStatus::Paid),
    other => panic!("expected verified, got {:?}", other),
  }
  assert_eq!(h.services.payments.stored_pending(), None);
  assert!(h.session.cart().is_empty());
  let body = h.transport.calls("POST", VERIFY)[0].body.clone().unwrap();
  assert_eq!(body["orderId"], "ord_1");
  assert_eq!(body["razorpay_payment_id"], "pay_1");
  assert_eq!(body["razorpay_signature"], "sig");
}

#[tokio::test]
#[serial]
async fn failed_verification_with_order_still_pending_is_unresolved() {
  let h = Harness::new();
  h.session
    .save_pending_transaction(&PendingTransaction::new("ord_1", "rzp_1"))
    .unwrap();
  h.transport
    .reply("POST", VERIFY, 200, json!({ "success": false, "message": "Signature mismatch" }))
    .reply("GET", PENDING, 200, json!({ "order": order_json("ord_1", "Pending", 280) }));

  let resolution = h
    .services
    .payments
    .on_success(&pending_order(), &gateway_payment())
    .await
    .unwrap();

  assert_eq!(
    resolution,
    PaymentResolution::Unresolved {
      order: pending_order(),
      reason: UnresolvedReason::VerificationFailed("Signature mismatch".to_string()),
    }
  );
  assert!(h.services.payments.stored_pending().is_some());
}

fn gateway_payment() -> storefront_client::payment::GatewayPaymentResponse {
  match gateway_success("rzp_1") {
    WidgetOutcome::Succeeded(response) => response,
    _ => unreachable!(),
  }
}

#[tokio::test]
#[serial]
async fn dismiss_with_settled_order_is_a_state_conflict() {
  let h = Harness::new();
  h.session
    .save_pending_transaction(&PendingTransaction::new("ord_1", "rzp_1"))
    .unwrap();
  h.transport
    .reply("GET", PENDING, 200, json!({ "order": order_json("ord_1", "Paid", 280) }));

  let err = h.services.payments.on_dismiss(&pending_order()).await.unwrap_err();

  assert!(matches!(err, StorefrontError::StateConflict { ref order_id } if order_id == "ord_1"));
  assert_eq!(h.services.payments.stored_pending(), None);
}

#[tokio::test]
#[serial]
async fn missing_pending_order_is_a_state_conflict() {
  let h = Harness::new();
  h.session
    .save_pending_transaction(&PendingTransaction::new("ord_1", "rzp_1"))
    .unwrap();
  h.transport.reply("GET", PENDING, 404, json!({ "message": "Order not found" }));

  let err = h.services.payments.check_pending_order_status("ord_1").await.unwrap_err();

  assert!(matches!(err, StorefrontError::StateConflict { .. }));
  assert_eq!(h.services.payments.stored_pending(), None);
}

#[tokio::test]
#[serial]
async fn gateway_failure_keeps_the_pending_record() {
  let h = Harness::new();
  h.session
    .save_pending_transaction(&PendingTransaction::new("ord_1", "rzp_1"))
    .unwrap();
  let failure = GatewayFailure {
    code: Some("BAD_REQUEST_ERROR".to_string()),
    description: "Card declined".to_string(),
    reason: Some("payment_failed".to_string()),
  };

  let err = h
    .services
    .payments
    .resolve(&pending_order(), WidgetOutcome::Failed(failure))
    .await
    .unwrap_err();

  assert!(matches!(err, StorefrontError::Gateway { ref reason, .. } if reason == "Card declined"));
  assert!(h.services.payments.stored_pending().is_some());
  assert_eq!(h.transport.requests().len(), 0);
}

#[tokio::test]
#[serial]
async fn verification_session_expiry_propagates_without_recheck() {
  let h = Harness::new();
  h.transport.reply("POST", VERIFY, 401, json!({ "message": "Token expired" }));

  let err = h
    .services
    .payments
    .on_success(&pending_order(), &gateway_payment())
    .await
    .unwrap_err();

  assert!(matches!(err, StorefrontError::Auth { .. }));
  assert_eq!(h.transport.count("GET", PENDING), 0);
  assert_eq!(h.redirect.redirects(), 1);
}

#[tokio::test]
#[serial]
async fn cancel_deletes_the_order_and_clears_the_record() {
  let h = Harness::new();
  h.session
    .save_pending_transaction(&PendingTransaction::new("ord_1", "rzp_1"))
    .unwrap();
  h.transport.reply("DELETE", "/api/orders/ord_1", 200, json!({ "message": "deleted" }));

  h.services.payments.cancel_pending_order("ord_1").await.unwrap();

  assert_eq!(h.transport.count("DELETE", "/api/orders/ord_1"), 1);
  assert_eq!(h.services.payments.stored_pending(), None);
}
