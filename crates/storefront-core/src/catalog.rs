//! Catalog entities: categories, products, complement groups and their
//! options, and the product-to-group link rows.
//!
//! The relational store behind the gateway does not cascade. Link rows and
//! options are removed explicitly by the operations in
//! [`service::guard`](crate::service::guard).

use std::collections::HashSet;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Stored rows ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
  pub id:         Uuid,
  pub store_id:   Uuid,
  pub name:       String,
  pub active:     bool,
  /// Display position. Not necessarily contiguous; ties fall back to
  /// `created_at`.
  pub order:      i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id:          Uuid,
  pub store_id:    Uuid,
  pub category_id: Uuid,
  pub name:        String,
  pub description: String,
  /// In currency units (minor-unit input divided by 100).
  pub price:       Decimal,
  pub image_url:   Option<String>,
  pub active:      bool,
  pub order:       i64,
  pub created_at:  DateTime<Utc>,
}

/// How many options of a group a customer may pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
  Single,
  #[default]
  Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplementGroup {
  pub id:          Uuid,
  pub store_id:    Uuid,
  pub name:        String,
  pub description: String,
  pub required:    bool,
  pub min:         u32,
  pub max:         u32,
  #[serde(rename = "type")]
  pub kind:        SelectionKind,
  pub active:      bool,
  pub created_at:  DateTime<Utc>,
}

/// One selectable option of a [`ComplementGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplementItem {
  pub id:          Uuid,
  pub group_id:    Uuid,
  pub name:        String,
  /// Added to the product's unit price when selected.
  pub price:       Decimal,
  pub active:      bool,
  pub image_url:   Option<String>,
  pub description: String,
  pub created_at:  DateTime<Utc>,
}

/// Many-to-many join between products and complement groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductComplement {
  pub id:         Uuid,
  pub product_id: Uuid,
  pub group_id:   Uuid,
  pub order:      i64,
  pub active:     bool,
}

// ─── Read models ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupWithItems {
  #[serde(flatten)]
  pub group: ComplementGroup,
  pub items: Vec<ComplementItem>,
}

/// A complement group as attached to one product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedGroup {
  pub order:  i64,
  pub active: bool,
  pub group:  GroupWithItems,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
  #[serde(flatten)]
  pub product:       Product,
  pub category_name: Option<String>,
  /// Linked groups in link order.
  pub complements:   Vec<LinkedGroup>,
}

impl ProductDetail {
  pub fn group_ids(&self) -> Vec<Uuid> {
    self.complements.iter().map(|l| l.group.group.id).collect()
  }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
  #[serde(flatten)]
  pub category: Category,
  pub products: Vec<ProductDetail>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A product to create. `price_in_cents` is divided by 100 on the way in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name:           String,
  #[serde(default)]
  pub description:    Option<String>,
  pub price_in_cents: i64,
  pub category_id:    Uuid,
  #[serde(default)]
  pub image_url:      Option<String>,
  #[serde(default)]
  pub active:         Option<bool>,
  /// Complement group ids, in display order. Duplicates are coalesced.
  #[serde(default)]
  pub complements:    Vec<Uuid>,
}

/// A product nested in a category creation request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedProduct {
  #[serde(default)]
  pub name:           String,
  #[serde(default)]
  pub description:    Option<String>,
  #[serde(default)]
  pub price_in_cents: i64,
  #[serde(default)]
  pub image_url:      Option<String>,
  #[serde(default)]
  pub active:         Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
  pub name:     String,
  #[serde(default)]
  pub products: Vec<NestedProduct>,
}

/// Partial category update. At least one field must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
  pub name:   Option<String>,
  pub active: Option<bool>,
  pub order:  Option<i64>,
}

impl CategoryPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// Partial product update as received from callers.
///
/// `complements`, when present, fully replaces the product's group links;
/// an empty list clears them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
  pub name:           Option<String>,
  pub description:    Option<String>,
  pub price_in_cents: Option<i64>,
  pub category_id:    Option<Uuid>,
  pub image_url:      Option<String>,
  pub active:         Option<bool>,
  pub order:          Option<i64>,
  pub complements:    Option<Vec<Uuid>>,
}

/// Normalised column changes for a product row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub price:       Option<Decimal>,
  pub category_id: Option<Uuid>,
  pub image_url:   Option<String>,
  pub active:      Option<bool>,
  pub order:       Option<i64>,
}

impl ProductChanges {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// An option inside a complement group create/update request.
///
/// `id` is kept as a string: clients send temporary ids for options that do
/// not exist yet, and those are treated as new.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
  #[serde(default)]
  pub id:          Option<String>,
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub price:       Option<Decimal>,
  #[serde(default)]
  pub active:      Option<bool>,
  #[serde(default, alias = "image")]
  pub image_url:   Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComplementGroup {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub required:    Option<bool>,
  #[serde(default)]
  pub min:         Option<u32>,
  #[serde(default)]
  pub max:         Option<u32>,
  #[serde(default, rename = "type")]
  pub kind:        Option<SelectionKind>,
  #[serde(default)]
  pub options:     Vec<OptionInput>,
}

/// Partial group update. `options`, when present, is the complete desired
/// option list: known ids are updated, the rest created, unlisted deleted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplementGroupPatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub required:    Option<bool>,
  pub min:         Option<u32>,
  pub max:         Option<u32>,
  #[serde(rename = "type")]
  pub kind:        Option<SelectionKind>,
  pub active:      Option<bool>,
  pub options:     Option<Vec<OptionInput>>,
}

/// Column changes for a group row (the `options` part handled separately).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupChanges {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub required:    Option<bool>,
  pub min:         Option<u32>,
  pub max:         Option<u32>,
  pub kind:        Option<SelectionKind>,
  pub active:      Option<bool>,
}

impl From<&ComplementGroupPatch> for GroupChanges {
  fn from(p: &ComplementGroupPatch) -> Self {
    Self {
      name:        p.name.clone(),
      description: p.description.clone(),
      required:    p.required,
      min:         p.min,
      max:         p.max,
      kind:        p.kind,
      active:      p.active,
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Convert a minor-unit amount to currency units.
pub fn price_from_cents(cents: i64) -> Result<Decimal> {
  if cents < 0 {
    return Err(Error::invalid("price must not be negative"));
  }
  Ok(Decimal::new(cents, 2))
}

/// Deduplicate by value, keeping the first occurrence's position.
pub fn dedupe<T: Copy + Eq + Hash>(ids: &[T]) -> Vec<T> {
  let mut seen = HashSet::with_capacity(ids.len());
  ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

pub(crate) fn check_selection_bounds(min: u32, max: u32) -> Result<()> {
  if min > max {
    return Err(Error::invalid(format!(
      "min ({min}) must not exceed max ({max})"
    )));
  }
  Ok(())
}
