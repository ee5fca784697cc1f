// tests/validation_tests.rs
mod common;

use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use storefront_client::models::{CartItem, CheckoutFormData};
use storefront_client::pricing::PricingSnapshot;
use storefront_client::validation::{
  is_valid_email, is_valid_gstin, is_valid_name, is_valid_phone, is_valid_pincode, validate_information, FormField,
  ValidationError,
};

fn check(form: &CheckoutFormData) -> Result<(), FormField> {
  let items = cart_items();
  let pricing = PricingSnapshot::for_items(&items, None);
  validate_information(form, &items, &pricing).map_err(|e| e.field)
}

fn with(edit: impl FnOnce(&mut CheckoutFormData)) -> CheckoutFormData {
  let mut form = valid_form();
  edit(&mut form);
  form
}

#[test]
fn a_complete_form_passes() {
  assert_eq!(check(&valid_form()), Ok(()));
}

#[test]
fn field_patterns() {
  assert!(is_valid_name("Mary Ann"));
  assert!(!is_valid_name("John1"));
  assert!(is_valid_email("a.b@shop.in"));
  assert!(!is_valid_email("a@b"));
  assert!(is_valid_phone("9876543210"));
  assert!(!is_valid_phone("12345"));
  assert!(is_valid_pincode("560001"));
  assert!(!is_valid_pincode("12345"));
  assert!(is_valid_gstin("22AAAAA0000A1Z5"));
  assert!(!is_valid_gstin("BAD"));
}

#[test]
fn rejections_name_the_offending_field() {
  assert_eq!(check(&with(|f| f.customer.first_name = "John1".into())), Err(FormField::FirstName));
  assert_eq!(check(&with(|f| f.customer.last_name = "  ".into())), Err(FormField::LastName));
  assert_eq!(check(&with(|f| f.customer.email = "john@".into())), Err(FormField::Email));
  assert_eq!(check(&with(|f| f.customer.phone = "12345".into())), Err(FormField::Phone));
  assert_eq!(check(&with(|f| f.shipping_address.city = String::new())), Err(FormField::City));
  assert_eq!(check(&with(|f| f.shipping_address.pincode = "12345".into())), Err(FormField::Pincode));
  assert_eq!(
    check(&with(|f| f.gst_details.gst_number = Some("BAD".into()))),
    Err(FormField::GstNumber)
  );
}

#[test]
fn gst_number_is_optional_but_checked_when_present() {
  assert_eq!(check(&with(|f| f.gst_details.gst_number = Some(String::new()))), Ok(()));
  assert_eq!(
    check(&with(|f| f.gst_details.gst_number = Some("22AAAAA0000A1Z5".into()))),
    Ok(())
  );
}

#[test]
fn empty_cart_is_reported_first() {
  let pricing = PricingSnapshot::compute(dec!(0), None);
  let err = validate_information(&CheckoutFormData::default(), &[], &pricing).unwrap_err();
  assert_eq!(err.field, FormField::Cart);
}

fn with_lines(lines: &[(i64, u32)]) -> Vec<CartItem> {
  lines
    .iter()
    .enumerate()
    .map(|(i, (price, quantity))| CartItem {
      id: (i + 1).to_string(),
      name: format!("Item {}", i + 1),
      price: Decimal::from(*price),
      quantity: *quantity,
      variant: None,
    })
    .collect()
}

fn check_cart(items: &[CartItem]) -> Result<(), ValidationError> {
  let pricing = PricingSnapshot::for_items(items, None);
  validate_information(&valid_form(), items, &pricing)
}

#[test]
fn zero_quantity_lines_do_not_count_as_a_cart() {
  let err = check_cart(&with_lines(&[(100, 0)])).unwrap_err();
  assert_eq!(err.field, FormField::Cart);
  assert_eq!(err.message, "Your cart is empty");

  let err = check_cart(&with_lines(&[(100, 2), (50, 0)])).unwrap_err();
  assert_eq!(err.field, FormField::Cart);
}

#[test]
fn overflowing_cart_amounts_are_rejected() {
  let items = vec![CartItem {
    id: "1".to_string(),
    name: "Bulk".to_string(),
    price: Decimal::MAX,
    quantity: 3,
    variant: None,
  }];
  assert_eq!(items[0].line_total(), None);

  let err = check_cart(&items).unwrap_err();
  assert_eq!(err.field, FormField::Cart);
}

#[test]
fn first_failing_gate_wins() {
  let form = with(|f| {
    f.customer.first_name = "J0hn".into();
    f.customer.phone = "1".into();
  });
  assert_eq!(check(&form), Err(FormField::FirstName));
}
