//! Customers, orders and the immutable order-item snapshot.
//!
//! An [`OrderItem`] copies the unit price and the chosen complements at
//! creation time. Nothing on the read side looks at live catalog prices;
//! line totals are derived from the snapshot on every read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use uuid::Uuid;

/// Name given to a customer created without one.
pub const CUSTOMER_PLACEHOLDER_NAME: &str = "Customer";
/// Display name for orders placed without customer details.
pub const GUEST_LABEL: &str = "Guest";
pub const DEFAULT_CANCEL_REASON: &str = "not informed";
pub const DEFAULT_CANCEL_ACTOR: &str = "store";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Order state. `Finished` and `Canceled` are terminal.
///
/// The `strum` spelling (`OUT_FOR_DELIVERY`) is the stored form; callers use
/// the lowercase labels from [`OrderStatus::label`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum OrderStatus {
  New,
  Preparing,
  OutForDelivery,
  Finished,
  Canceled,
}

impl OrderStatus {
  /// Map an external status label to the internal state.
  ///
  /// Accepts the display labels plus the internal names in any case.
  pub fn from_label(label: &str) -> Option<Self> {
    let label = label.trim();
    match label.to_ascii_lowercase().as_str() {
      "new" => Some(Self::New),
      "preparing" => Some(Self::Preparing),
      "delivering" => Some(Self::OutForDelivery),
      "finished" => Some(Self::Finished),
      "canceled" | "cancelled" => Some(Self::Canceled),
      _ => label.parse().ok(),
    }
  }

  /// Inverse of [`OrderStatus::from_label`].
  pub fn label(self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Preparing => "preparing",
      Self::OutForDelivery => "delivering",
      Self::Finished => "finished",
      Self::Canceled => "canceled",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Finished | Self::Canceled)
  }

  fn rank(self) -> u8 {
    match self {
      Self::New => 0,
      Self::Preparing => 1,
      Self::OutForDelivery => 2,
      Self::Finished => 3,
      Self::Canceled => 4,
    }
  }

  /// Forward moves (skipping steps is allowed) and cancellation from any
  /// non-terminal state. Nothing leaves a terminal state.
  pub fn can_transition_to(self, next: Self) -> bool {
    if self.is_terminal() {
      return false;
    }
    next == Self::Canceled || next.rank() >= self.rank()
  }
}

// ─── Stored rows ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub id:         Uuid,
  pub store_id:   Uuid,
  pub name:       String,
  /// Dedupe key within a store (not declared unique).
  pub phone:      String,
  pub address:    Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id:             Uuid,
  pub store_id:       Uuid,
  pub customer_id:    Option<Uuid>,
  pub status:         OrderStatus,
  /// As computed by the caller.
  pub total:          Decimal,
  pub payment_method: Option<String>,
  pub delivery_fee:   Decimal,
  pub created_at:     DateTime<Utc>,
  pub finalized_at:   Option<DateTime<Utc>>,
  pub canceled_at:    Option<DateTime<Utc>>,
  pub cancel_reason:  Option<String>,
  pub canceled_by:    Option<String>,
}

/// A complement choice as frozen into an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplementSnapshot {
  pub option_name: String,
  pub group_title: String,
  pub quantity:    u32,
  pub price_delta: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id:          Uuid,
  pub order_id:    Uuid,
  pub product_id:  Uuid,
  pub quantity:    u32,
  pub unit_price:  Decimal,
  pub complements: Vec<ComplementSnapshot>,
}

impl OrderItem {
  /// `(unit_price + Σ price_delta × quantity) × quantity`, or `None` when
  /// the result does not fit a [`Decimal`].
  pub fn line_total(&self) -> Option<Decimal> {
    line_total(self.unit_price, self.quantity, &self.complements)
  }
}

pub fn line_total(
  unit_price: Decimal,
  quantity: u32,
  complements: &[ComplementSnapshot],
) -> Option<Decimal> {
  let extras = complements.iter().try_fold(Decimal::ZERO, |sum, c| {
    c.price_delta
      .checked_mul(Decimal::from(c.quantity))
      .and_then(|extra| sum.checked_add(extra))
  })?;
  unit_price
    .checked_add(extras)?
    .checked_mul(Decimal::from(quantity))
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A complement as sent by a caller.
///
/// Older clients send `name`/`qty`/`price`; newer ones the snapshot field
/// names. Both are accepted and coerced by [`ComplementInput::into_snapshot`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplementInput {
  #[serde(default, alias = "name")]
  pub option_name: Option<String>,
  #[serde(default, alias = "groupName", alias = "group")]
  pub group_title: Option<String>,
  #[serde(default, alias = "qty")]
  pub quantity:    Option<u32>,
  #[serde(default, alias = "price")]
  pub price_delta: Option<Decimal>,
}

impl ComplementInput {
  pub fn into_snapshot(self) -> ComplementSnapshot {
    ComplementSnapshot {
      option_name: self.option_name.unwrap_or_default(),
      group_title: self.group_title.unwrap_or_default(),
      quantity:    self.quantity.filter(|q| *q > 0).unwrap_or(1),
      price_delta: self.price_delta.unwrap_or(Decimal::ZERO),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
  pub name:    Option<String>,
  pub phone:   Option<String>,
  pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
  pub product_id:  Uuid,
  /// Missing or zero means 1.
  #[serde(default)]
  pub quantity:    Option<u32>,
  pub unit_price:  Decimal,
  #[serde(default)]
  pub complements: Vec<ComplementInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
  #[serde(default)]
  pub customer:       Option<CustomerInfo>,
  pub items:          Vec<NewOrderItem>,
  #[serde(default)]
  pub payment_method: Option<String>,
  #[serde(default)]
  pub delivery_fee:   Option<Decimal>,
  pub total:          Decimal,
}

// ─── Read model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
  pub id:           Uuid,
  pub product_id:   Uuid,
  pub product_name: Option<String>,
  pub quantity:     u32,
  pub unit_price:   Decimal,
  pub complements:  Vec<ComplementSnapshot>,
  /// Derived on read; never stored. `None` if out of range.
  pub line_total:   Option<Decimal>,
}

/// An order normalised for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
  pub id:             Uuid,
  pub store_id:       Uuid,
  pub status:         OrderStatus,
  pub status_label:   &'static str,
  pub customer_id:    Option<Uuid>,
  pub customer_name:  String,
  pub customer_phone: Option<String>,
  pub address:        Option<String>,
  pub short_address:  Option<String>,
  pub payment_method: Option<String>,
  pub delivery_fee:   Decimal,
  pub total:          Decimal,
  pub created_at:     DateTime<Utc>,
  pub finalized_at:   Option<DateTime<Utc>>,
  pub canceled_at:    Option<DateTime<Utc>>,
  pub cancel_reason:  Option<String>,
  pub canceled_by:    Option<String>,
  pub items:          Vec<OrderItemView>,
}

impl OrderView {
  pub fn build(
    order: Order,
    customer: Option<&Customer>,
    items: Vec<(OrderItem, Option<String>)>,
  ) -> Self {
    let address = customer.and_then(|c| c.address.clone());
    Self {
      id:             order.id,
      store_id:       order.store_id,
      status:         order.status,
      status_label:   order.status.label(),
      customer_id:    order.customer_id,
      customer_name:  customer
        .map(|c| c.name.clone())
        .unwrap_or_else(|| GUEST_LABEL.to_owned()),
      customer_phone: customer.map(|c| c.phone.clone()),
      short_address:  address.as_deref().and_then(short_address),
      address,
      payment_method: order.payment_method,
      delivery_fee:   order.delivery_fee,
      total:          order.total,
      created_at:     order.created_at,
      finalized_at:   order.finalized_at,
      canceled_at:    order.canceled_at,
      cancel_reason:  order.cancel_reason,
      canceled_by:    order.canceled_by,
      items:          items
        .into_iter()
        .map(|(item, product_name)| OrderItemView {
          line_total: item.line_total(),
          id: item.id,
          product_id: item.product_id,
          product_name,
          quantity: item.quantity,
          unit_price: item.unit_price,
          complements: item.complements,
        })
        .collect(),
    }
  }
}

/// The part of an address before the first comma, trimmed.
pub fn short_address(address: &str) -> Option<String> {
  let head = address.split(',').next().unwrap_or_default().trim();
  (!head.is_empty()).then(|| head.to_owned())
}
