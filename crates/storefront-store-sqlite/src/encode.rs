//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 with a fixed microsecond width, so string order
//! equals time order. Money is stored as decimal text to keep it exact.
//! UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rust_decimal::Decimal;
use storefront_core::{
  catalog::{
    Category, ComplementGroup, ComplementItem, Product, ProductComplement,
    SelectionKind,
  },
  order::{ComplementSnapshot, Customer, Order, OrderItem, OrderStatus},
  tenant::{Store, StoreSettings},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn encode_opt_dt(dt: Option<DateTime<Utc>>) -> Option<String> {
  dt.map(encode_dt)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_decimal(d: Decimal) -> String { d.normalize().to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

pub fn encode_status(s: OrderStatus) -> &'static str {
  match s {
    OrderStatus::New => "NEW",
    OrderStatus::Preparing => "PREPARING",
    OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
    OrderStatus::Finished => "FINISHED",
    OrderStatus::Canceled => "CANCELED",
  }
}

pub fn decode_status(s: &str) -> Result<OrderStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown order status: {s:?}")))
}

pub fn encode_kind(k: SelectionKind) -> &'static str {
  match k {
    SelectionKind::Single => "single",
    SelectionKind::Multiple => "multiple",
  }
}

pub fn decode_kind(s: &str) -> Result<SelectionKind> {
  match s {
    "single" => Ok(SelectionKind::Single),
    "multiple" => Ok(SelectionKind::Multiple),
    other => Err(Error::Decode(format!("unknown selection kind: {other:?}"))),
  }
}

pub fn encode_snapshot(c: &[ComplementSnapshot]) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub fn decode_snapshot(s: &str) -> Result<Vec<ComplementSnapshot>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each `Raw*` struct mirrors the column list in its `COLUMNS` constant, read
// positionally by `from_row` inside the connection thread and decoded into
// the domain type afterwards.

pub struct RawStore {
  pub id:          String,
  pub user_id:     String,
  pub name:        String,
  pub subdomain:   String,
  pub description: Option<String>,
  pub logo_url:    Option<String>,
  pub cover_image: Option<String>,
  pub address:     Option<String>,
  pub created_at:  String,
}

impl RawStore {
  pub const COLUMNS: &'static str = "id, user_id, name, subdomain, description, \
                                     logo_url, cover_image, address, created_at";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          r.get(0)?,
      user_id:     r.get(1)?,
      name:        r.get(2)?,
      subdomain:   r.get(3)?,
      description: r.get(4)?,
      logo_url:    r.get(5)?,
      cover_image: r.get(6)?,
      address:     r.get(7)?,
      created_at:  r.get(8)?,
    })
  }

  pub fn into_store(self) -> Result<Store> {
    Ok(Store {
      id:          decode_uuid(&self.id)?,
      user_id:     decode_uuid(&self.user_id)?,
      name:        self.name,
      subdomain:   self.subdomain,
      description: self.description,
      logo_url:    self.logo_url,
      cover_image: self.cover_image,
      address:     self.address,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawSettings {
  pub id:              String,
  pub store_id:        String,
  pub is_open:         bool,
  pub open_time:       String,
  pub close_time:      String,
  pub delivery_fee:    String,
  pub min_order_value: String,
  pub estimated_time:  String,
  pub whatsapp:        Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawSettings {
  pub const COLUMNS: &'static str = "id, store_id, is_open, open_time, close_time, \
                                     delivery_fee, min_order_value, estimated_time, \
                                     whatsapp, created_at, updated_at";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              r.get(0)?,
      store_id:        r.get(1)?,
      is_open:         r.get(2)?,
      open_time:       r.get(3)?,
      close_time:      r.get(4)?,
      delivery_fee:    r.get(5)?,
      min_order_value: r.get(6)?,
      estimated_time:  r.get(7)?,
      whatsapp:        r.get(8)?,
      created_at:      r.get(9)?,
      updated_at:      r.get(10)?,
    })
  }

  pub fn into_settings(self) -> Result<StoreSettings> {
    Ok(StoreSettings {
      id:              decode_uuid(&self.id)?,
      store_id:        decode_uuid(&self.store_id)?,
      is_open:         self.is_open,
      open_time:       self.open_time,
      close_time:      self.close_time,
      delivery_fee:    decode_decimal(&self.delivery_fee)?,
      min_order_value: decode_decimal(&self.min_order_value)?,
      estimated_time:  self.estimated_time,
      whatsapp:        self.whatsapp,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawCategory {
  pub id:         String,
  pub store_id:   String,
  pub name:       String,
  pub active:     bool,
  pub position:   i64,
  pub created_at: String,
}

impl RawCategory {
  pub const COLUMNS: &'static str = "id, store_id, name, active, position, created_at";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         r.get(0)?,
      store_id:   r.get(1)?,
      name:       r.get(2)?,
      active:     r.get(3)?,
      position:   r.get(4)?,
      created_at: r.get(5)?,
    })
  }

  pub fn into_category(self) -> Result<Category> {
    Ok(Category {
      id:         decode_uuid(&self.id)?,
      store_id:   decode_uuid(&self.store_id)?,
      name:       self.name,
      active:     self.active,
      order:      self.position,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawProduct {
  pub id:          String,
  pub store_id:    String,
  pub category_id: String,
  pub name:        String,
  pub description: String,
  pub price:       String,
  pub image_url:   Option<String>,
  pub active:      bool,
  pub position:    i64,
  pub created_at:  String,
}

impl RawProduct {
  pub const COLUMNS: &'static str = "id, store_id, category_id, name, description, \
                                     price, image_url, active, position, created_at";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          r.get(0)?,
      store_id:    r.get(1)?,
      category_id: r.get(2)?,
      name:        r.get(3)?,
      description: r.get(4)?,
      price:       r.get(5)?,
      image_url:   r.get(6)?,
      active:      r.get(7)?,
      position:    r.get(8)?,
      created_at:  r.get(9)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      id:          decode_uuid(&self.id)?,
      store_id:    decode_uuid(&self.store_id)?,
      category_id: decode_uuid(&self.category_id)?,
      name:        self.name,
      description: self.description,
      price:       decode_decimal(&self.price)?,
      image_url:   self.image_url,
      active:      self.active,
      order:       self.position,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawGroup {
  pub id:          String,
  pub store_id:    String,
  pub name:        String,
  pub description: String,
  pub required:    bool,
  pub min_select:  u32,
  pub max_select:  u32,
  pub kind:        String,
  pub active:      bool,
  pub created_at:  String,
}

impl RawGroup {
  pub const COLUMNS: &'static str = "id, store_id, name, description, required, \
                                     min_select, max_select, kind, active, created_at";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          r.get(0)?,
      store_id:    r.get(1)?,
      name:        r.get(2)?,
      description: r.get(3)?,
      required:    r.get(4)?,
      min_select:  r.get(5)?,
      max_select:  r.get(6)?,
      kind:        r.get(7)?,
      active:      r.get(8)?,
      created_at:  r.get(9)?,
    })
  }

  pub fn into_group(self) -> Result<ComplementGroup> {
    Ok(ComplementGroup {
      id:          decode_uuid(&self.id)?,
      store_id:    decode_uuid(&self.store_id)?,
      name:        self.name,
      description: self.description,
      required:    self.required,
      min:         self.min_select,
      max:         self.max_select,
      kind:        decode_kind(&self.kind)?,
      active:      self.active,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawItem {
  pub id:          String,
  pub group_id:    String,
  pub name:        String,
  pub price:       String,
  pub active:      bool,
  pub image_url:   Option<String>,
  pub description: String,
  pub created_at:  String,
}

impl RawItem {
  pub const COLUMNS: &'static str = "id, group_id, name, price, active, image_url, \
                                     description, created_at";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          r.get(0)?,
      group_id:    r.get(1)?,
      name:        r.get(2)?,
      price:       r.get(3)?,
      active:      r.get(4)?,
      image_url:   r.get(5)?,
      description: r.get(6)?,
      created_at:  r.get(7)?,
    })
  }

  pub fn into_item(self) -> Result<ComplementItem> {
    Ok(ComplementItem {
      id:          decode_uuid(&self.id)?,
      group_id:    decode_uuid(&self.group_id)?,
      name:        self.name,
      price:       decode_decimal(&self.price)?,
      active:      self.active,
      image_url:   self.image_url,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawLink {
  pub id:         String,
  pub product_id: String,
  pub group_id:   String,
  pub position:   i64,
  pub active:     bool,
}

impl RawLink {
  pub const COLUMNS: &'static str = "id, product_id, group_id, position, active";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         r.get(0)?,
      product_id: r.get(1)?,
      group_id:   r.get(2)?,
      position:   r.get(3)?,
      active:     r.get(4)?,
    })
  }

  pub fn into_link(self) -> Result<ProductComplement> {
    Ok(ProductComplement {
      id:         decode_uuid(&self.id)?,
      product_id: decode_uuid(&self.product_id)?,
      group_id:   decode_uuid(&self.group_id)?,
      order:      self.position,
      active:     self.active,
    })
  }
}

pub struct RawCustomer {
  pub id:         String,
  pub store_id:   String,
  pub name:       String,
  pub phone:      String,
  pub address:    Option<String>,
  pub created_at: String,
}

impl RawCustomer {
  pub const COLUMNS: &'static str = "id, store_id, name, phone, address, created_at";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         r.get(0)?,
      store_id:   r.get(1)?,
      name:       r.get(2)?,
      phone:      r.get(3)?,
      address:    r.get(4)?,
      created_at: r.get(5)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      id:         decode_uuid(&self.id)?,
      store_id:   decode_uuid(&self.store_id)?,
      name:       self.name,
      phone:      self.phone,
      address:    self.address,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawOrder {
  pub id:             String,
  pub store_id:       String,
  pub customer_id:    Option<String>,
  pub status:         String,
  pub total:          String,
  pub payment_method: Option<String>,
  pub delivery_fee:   String,
  pub created_at:     String,
  pub finalized_at:   Option<String>,
  pub canceled_at:    Option<String>,
  pub cancel_reason:  Option<String>,
  pub canceled_by:    Option<String>,
}

impl RawOrder {
  pub const COLUMNS: &'static str = "id, store_id, customer_id, status, total, \
                                     payment_method, delivery_fee, created_at, \
                                     finalized_at, canceled_at, cancel_reason, \
                                     canceled_by";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             r.get(0)?,
      store_id:       r.get(1)?,
      customer_id:    r.get(2)?,
      status:         r.get(3)?,
      total:          r.get(4)?,
      payment_method: r.get(5)?,
      delivery_fee:   r.get(6)?,
      created_at:     r.get(7)?,
      finalized_at:   r.get(8)?,
      canceled_at:    r.get(9)?,
      cancel_reason:  r.get(10)?,
      canceled_by:    r.get(11)?,
    })
  }

  pub fn into_order(self) -> Result<Order> {
    Ok(Order {
      id:             decode_uuid(&self.id)?,
      store_id:       decode_uuid(&self.store_id)?,
      customer_id:    decode_opt_uuid(self.customer_id)?,
      status:         decode_status(&self.status)?,
      total:          decode_decimal(&self.total)?,
      payment_method: self.payment_method,
      delivery_fee:   decode_decimal(&self.delivery_fee)?,
      created_at:     decode_dt(&self.created_at)?,
      finalized_at:   decode_opt_dt(self.finalized_at)?,
      canceled_at:    decode_opt_dt(self.canceled_at)?,
      cancel_reason:  self.cancel_reason,
      canceled_by:    self.canceled_by,
    })
  }
}

pub struct RawOrderItem {
  pub id:          String,
  pub order_id:    String,
  pub product_id:  String,
  pub quantity:    u32,
  pub unit_price:  String,
  pub complements: String,
}

impl RawOrderItem {
  pub const COLUMNS: &'static str = "id, order_id, product_id, quantity, unit_price, \
                                     complements";

  pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          r.get(0)?,
      order_id:    r.get(1)?,
      product_id:  r.get(2)?,
      quantity:    r.get(3)?,
      unit_price:  r.get(4)?,
      complements: r.get(5)?,
    })
  }

  pub fn into_item(self) -> Result<OrderItem> {
    Ok(OrderItem {
      id:          decode_uuid(&self.id)?,
      order_id:    decode_uuid(&self.order_id)?,
      product_id:  decode_uuid(&self.product_id)?,
      quantity:    self.quantity,
      unit_price:  decode_decimal(&self.unit_price)?,
      complements: decode_snapshot(&self.complements)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_as_strings() {
    let a = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let b = a + chrono::Duration::microseconds(1500);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn status_text_matches_strum_spelling() {
    for s in [
      OrderStatus::New,
      OrderStatus::Preparing,
      OrderStatus::OutForDelivery,
      OrderStatus::Finished,
      OrderStatus::Canceled,
    ] {
      assert_eq!(encode_status(s), s.as_ref());
      assert_eq!(decode_status(encode_status(s)).unwrap(), s);
    }
  }

  #[test]
  fn decimals_are_stored_exactly() {
    let d = Decimal::new(1050, 2);
    assert_eq!(encode_decimal(d), "10.5");
    assert_eq!(decode_decimal("10.50").unwrap(), d);
  }
}
