//! The `Repository` gateway trait and its write vocabulary.
//!
//! The trait is implemented by storage backends (e.g.
//! `storefront-store-sqlite`). Every operation in [`crate::service`] depends
//! on this abstraction only.
//!
//! Reads are typed per entity. Writes are values of [`Write`] applied either
//! one at a time ([`Repository::apply`]) or as an all-or-nothing batch
//! ([`Repository::transaction`]). Ids are generated by the caller, so a batch
//! that creates related rows can be assembled before it is submitted.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  catalog::{
    Category, CategoryPatch, ComplementGroup, ComplementItem, GroupChanges,
    Product, ProductChanges, ProductComplement,
  },
  order::{Customer, Order, OrderItem, OrderStatus},
  tenant::{Store, StoreProfilePatch, StoreSettings},
};

// ─── Error classification ────────────────────────────────────────────────────

/// What the core needs to know about a gateway failure.
pub trait GatewayError: std::error::Error + Send + Sync + 'static {
  /// A unique constraint rejected the write (another row holds the key).
  fn is_unique_violation(&self) -> bool;

  /// A [`Write::RequireUnreferenced`] guard tripped and the batch was rolled
  /// back.
  fn is_referenced(&self) -> bool;

  /// A conditional write found its row changed since it was read (see
  /// [`Write::SetOrderStatus`]) and the batch was rolled back.
  fn is_stale(&self) -> bool;
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`Repository::list_products`]. Always store-scoped.
#[derive(Debug, Clone)]
pub struct ProductFilter {
  pub store_id:    Uuid,
  pub category_id: Option<Uuid>,
  /// Restrict to these ids. `Some(vec![])` matches nothing.
  pub ids:         Option<Vec<Uuid>>,
  pub active_only: bool,
}

impl ProductFilter {
  pub fn store(store_id: Uuid) -> Self {
    Self { store_id, category_id: None, ids: None, active_only: false }
  }

  pub fn in_category(mut self, category_id: Uuid) -> Self {
    self.category_id = Some(category_id);
    self
  }

  pub fn with_ids(mut self, ids: Vec<Uuid>) -> Self {
    self.ids = Some(ids);
    self
  }

  pub fn active_only(mut self) -> Self {
    self.active_only = true;
    self
  }
}

/// Which product rows a scoped statement targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductScope {
  Ids(Vec<Uuid>),
  /// Every product whose `category_id` matches, evaluated inside the
  /// statement so rows inserted concurrently are included.
  Category(Uuid),
}

/// Entities that carry a display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioned {
  Category,
  Product,
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// One statement against the store.
///
/// Every update and delete of a store-owned row carries `store_id`; rows of
/// other tenants are never touched, the statement simply matches nothing.
#[derive(Debug, Clone)]
pub enum Write {
  InsertStore(Store),
  UpdateStoreProfile { store_id: Uuid, patch: StoreProfilePatch },
  SetSubdomain { store_id: Uuid, subdomain: String },

  InsertSettings(StoreSettings),
  /// Overwrite the mutable settings columns of the row for `store_id`.
  UpdateSettings(StoreSettings),

  InsertCategory(Category),
  UpdateCategory { store_id: Uuid, id: Uuid, patch: CategoryPatch },
  DeleteCategory { store_id: Uuid, id: Uuid },

  InsertProduct(Product),
  UpdateProduct { store_id: Uuid, id: Uuid, changes: ProductChanges },
  DeleteProducts { store_id: Uuid, scope: ProductScope },

  InsertProductComplement(ProductComplement),
  /// Remove the group links of the products in scope.
  DeleteProductComplements(ProductScope),
  /// Remove every link that points at `group_id`.
  DeleteGroupLinks { group_id: Uuid },

  InsertComplementGroup(ComplementGroup),
  UpdateComplementGroup { store_id: Uuid, id: Uuid, changes: GroupChanges },
  DeleteComplementGroup { store_id: Uuid, id: Uuid },

  InsertComplementItem(ComplementItem),
  /// Overwrite an option's editable columns; matched by id and group.
  UpdateComplementItem(ComplementItem),
  /// Delete the options of `group_id` whose id is not in `keep`.
  DeleteComplementItems { group_id: Uuid, keep: Vec<Uuid> },
  DeleteComplementItem { group_id: Uuid, id: Uuid },

  InsertCustomer(Customer),

  InsertOrder(Order),
  InsertOrderItem(OrderItem),
  /// Status change together with its timestamp bookkeeping, as one write.
  /// Applies only while the stored status is still `expected`; otherwise the
  /// batch fails with [`GatewayError::is_stale`].
  SetOrderStatus {
    store_id:      Uuid,
    id:            Uuid,
    expected:      OrderStatus,
    status:        OrderStatus,
    finalized_at:  Option<DateTime<Utc>>,
    canceled_at:   Option<DateTime<Utc>>,
    cancel_reason: Option<String>,
    canceled_by:   Option<String>,
  },

  SetPosition { kind: Positioned, store_id: Uuid, id: Uuid, position: i64 },

  /// Abort the enclosing batch if any order item references a product in
  /// scope. Reported through [`GatewayError::is_referenced`].
  RequireUnreferenced(ProductScope),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the transactional relational store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Repository: Send + Sync {
  type Error: GatewayError;

  // ── Stores and settings ───────────────────────────────────────────────

  fn get_store(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  fn get_store_by_subdomain(
    &self,
    subdomain: String,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  /// The first store owned by `user_id`, oldest first.
  fn get_store_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Store>, Self::Error>> + Send + '_;

  fn find_settings(
    &self,
    store_id: Uuid,
  ) -> impl Future<Output = Result<Option<StoreSettings>, Self::Error>> + Send + '_;

  // ── Catalog ───────────────────────────────────────────────────────────

  /// Categories of a store ordered by (`order`, `created_at`).
  fn list_categories(
    &self,
    store_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn get_category(
    &self,
    store_id: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  /// Products matching `filter` ordered by (`order`, `created_at`).
  fn list_products(
    &self,
    filter: ProductFilter,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  fn get_product(
    &self,
    store_id: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  /// Link rows of the given products ordered by (`product_id`, `order`).
  fn list_product_complements(
    &self,
    product_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<ProductComplement>, Self::Error>> + Send + '_;

  /// Groups of a store ordered by `created_at`.
  fn list_complement_groups(
    &self,
    store_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ComplementGroup>, Self::Error>> + Send + '_;

  fn get_complement_group(
    &self,
    store_id: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ComplementGroup>, Self::Error>> + Send + '_;

  /// Options of the given groups ordered by `created_at`.
  fn list_complement_items(
    &self,
    group_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<ComplementItem>, Self::Error>> + Send + '_;

  fn get_complement_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ComplementItem>, Self::Error>> + Send + '_;

  // ── Customers and orders ──────────────────────────────────────────────

  fn find_customer_by_phone(
    &self,
    store_id: Uuid,
    phone: String,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  fn list_customers(
    &self,
    store_id: Uuid,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;

  /// Orders of a store, newest first.
  fn list_orders(
    &self,
    store_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Order>, Self::Error>> + Send + '_;

  fn get_order(
    &self,
    store_id: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Order>, Self::Error>> + Send + '_;

  /// Items of the given orders in insertion order.
  fn list_order_items(
    &self,
    order_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<OrderItem>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Apply every write in `batch` atomically: all commit or none do.
  fn transaction(
    &self,
    batch: Vec<Write>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply a single write.
  fn apply(
    &self,
    write: Write,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    self.transaction(vec![write])
  }
}
