// storefront_client/src/models/cart_item.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// One line of the pre-checkout cart. Prices are decimal rupees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
  #[serde(deserialize_with = "id_from_string_or_number")]
  pub id: String,
  pub name: String,
  pub price: Decimal,
  pub quantity: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variant: Option<String>,
}

impl CartItem {
  /// `None` when price × quantity does not fit a `Decimal`.
  pub fn line_total(&self) -> Option<Decimal> {
    self.price.checked_mul(Decimal::from(self.quantity))
  }
}

// Carts written by older storefront builds store numeric product ids.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum RawId {
    Text(String),
    Number(i64),
  }

  Ok(match RawId::deserialize(deserializer)? {
    RawId::Text(s) => s,
    RawId::Number(n) => n.to_string(),
  })
}
