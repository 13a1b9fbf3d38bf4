//! [`SqliteStore`], the SQLite implementation of [`Repository`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, Row, params_from_iter, types::Value};
use storefront_core::{
  catalog::{Category, ComplementGroup, ComplementItem, Product, ProductComplement},
  order::{Customer, Order, OrderItem},
  repo::{ProductFilter, Repository, Write},
  tenant::{Store, StoreSettings},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawCategory, RawCustomer, RawGroup, RawItem, RawLink, RawOrder, RawOrderItem,
    RawProduct, RawSettings, RawStore, encode_uuid,
  },
  schema::SCHEMA,
  write,
};

/// `SELECT <columns of $raw> FROM $table $rest`.
macro_rules! select {
  ($raw:ty, $table:literal, $rest:literal $(,)?) => {
    format!(concat!("SELECT {} FROM ", $table, " ", $rest), <$raw>::COLUMNS)
  };
}

type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

fn ids(values: &[Uuid]) -> Vec<Value> {
  values.iter().map(|id| Value::Text(encode_uuid(*id))).collect()
}

fn in_list(n: usize) -> String {
  let marks = vec!["?"; n].join(", ");
  format!("({marks})")
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A storefront repository backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All
/// statements run on the connection's dedicated thread, one call at a time,
/// so a [`Repository::transaction`] batch is never interleaved with another.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests and throwaway servers.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_one<T: Send + 'static>(
    &self,
    sql: String,
    values: Vec<Value>,
    map: RowMapper<T>,
  ) -> Result<Option<T>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, params_from_iter(values), map).optional()?)
      })
      .await?;
    Ok(row)
  }

  async fn fetch_all<T: Send + 'static>(
    &self,
    sql: String,
    values: Vec<Value>,
    map: RowMapper<T>,
  ) -> Result<Vec<T>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(values), map)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

// ─── Repository impl ─────────────────────────────────────────────────────────

impl Repository for SqliteStore {
  type Error = Error;

  // ── Stores and settings ───────────────────────────────────────────────────

  async fn get_store(&self, id: Uuid) -> Result<Option<Store>> {
    let sql = select!(RawStore, "stores", "WHERE id = ?1");
    self
      .fetch_one(sql, ids(&[id]), RawStore::from_row)
      .await?
      .map(RawStore::into_store)
      .transpose()
  }

  async fn get_store_by_subdomain(&self, subdomain: String) -> Result<Option<Store>> {
    let sql = select!(RawStore, "stores", "WHERE subdomain = ?1");
    self
      .fetch_one(sql, vec![Value::Text(subdomain)], RawStore::from_row)
      .await?
      .map(RawStore::into_store)
      .transpose()
  }

  async fn get_store_by_user(&self, user_id: Uuid) -> Result<Option<Store>> {
    let sql = select!(
      RawStore,
      "stores",
      "WHERE user_id = ?1 ORDER BY created_at, rowid LIMIT 1"
    );
    self
      .fetch_one(sql, ids(&[user_id]), RawStore::from_row)
      .await?
      .map(RawStore::into_store)
      .transpose()
  }

  async fn find_settings(&self, store_id: Uuid) -> Result<Option<StoreSettings>> {
    let sql = select!(RawSettings, "store_settings", "WHERE store_id = ?1");
    self
      .fetch_one(sql, ids(&[store_id]), RawSettings::from_row)
      .await?
      .map(RawSettings::into_settings)
      .transpose()
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn list_categories(&self, store_id: Uuid) -> Result<Vec<Category>> {
    let sql = format!(
      "SELECT {} FROM categories WHERE store_id = ?1 ORDER BY position, created_at, rowid",
      RawCategory::COLUMNS
    );
    self
      .fetch_all(sql, ids(&[store_id]), RawCategory::from_row)
      .await?
      .into_iter()
      .map(RawCategory::into_category)
      .collect()
  }

  async fn get_category(&self, store_id: Uuid, id: Uuid) -> Result<Option<Category>> {
    let sql = select!(
      RawCategory,
      "categories",
      "WHERE id = ?1 AND store_id = ?2"
    );
    self
      .fetch_one(sql, ids(&[id, store_id]), RawCategory::from_row)
      .await?
      .map(RawCategory::into_category)
      .transpose()
  }

  async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>> {
    let mut sql = format!(
      "SELECT {} FROM products WHERE store_id = ?",
      RawProduct::COLUMNS
    );
    let mut values = ids(&[filter.store_id]);

    if let Some(category_id) = filter.category_id {
      sql.push_str(" AND category_id = ?");
      values.extend(ids(&[category_id]));
    }
    if let Some(wanted) = &filter.ids {
      if wanted.is_empty() {
        return Ok(Vec::new());
      }
      sql.push_str(" AND id IN ");
      sql.push_str(&in_list(wanted.len()));
      values.extend(ids(wanted));
    }
    if filter.active_only {
      sql.push_str(" AND active = 1");
    }
    sql.push_str(" ORDER BY position, created_at, rowid");

    self
      .fetch_all(sql, values, RawProduct::from_row)
      .await?
      .into_iter()
      .map(RawProduct::into_product)
      .collect()
  }

  async fn get_product(&self, store_id: Uuid, id: Uuid) -> Result<Option<Product>> {
    let sql = select!(
      RawProduct,
      "products",
      "WHERE id = ?1 AND store_id = ?2"
    );
    self
      .fetch_one(sql, ids(&[id, store_id]), RawProduct::from_row)
      .await?
      .map(RawProduct::into_product)
      .transpose()
  }

  async fn list_product_complements(
    &self,
    product_ids: Vec<Uuid>,
  ) -> Result<Vec<ProductComplement>> {
    if product_ids.is_empty() {
      return Ok(Vec::new());
    }
    let sql = format!(
      "SELECT {} FROM product_complements WHERE product_id IN {}
       ORDER BY product_id, position, rowid",
      RawLink::COLUMNS,
      in_list(product_ids.len())
    );
    self
      .fetch_all(sql, ids(&product_ids), RawLink::from_row)
      .await?
      .into_iter()
      .map(RawLink::into_link)
      .collect()
  }

  async fn list_complement_groups(&self, store_id: Uuid) -> Result<Vec<ComplementGroup>> {
    let sql = format!(
      "SELECT {} FROM complement_groups WHERE store_id = ?1 ORDER BY created_at, rowid",
      RawGroup::COLUMNS
    );
    self
      .fetch_all(sql, ids(&[store_id]), RawGroup::from_row)
      .await?
      .into_iter()
      .map(RawGroup::into_group)
      .collect()
  }

  async fn get_complement_group(
    &self,
    store_id: Uuid,
    id: Uuid,
  ) -> Result<Option<ComplementGroup>> {
    let sql = select!(
      RawGroup,
      "complement_groups",
      "WHERE id = ?1 AND store_id = ?2"
    );
    self
      .fetch_one(sql, ids(&[id, store_id]), RawGroup::from_row)
      .await?
      .map(RawGroup::into_group)
      .transpose()
  }

  async fn list_complement_items(&self, group_ids: Vec<Uuid>) -> Result<Vec<ComplementItem>> {
    if group_ids.is_empty() {
      return Ok(Vec::new());
    }
    let sql = format!(
      "SELECT {} FROM complement_items WHERE group_id IN {} ORDER BY created_at, rowid",
      RawItem::COLUMNS,
      in_list(group_ids.len())
    );
    self
      .fetch_all(sql, ids(&group_ids), RawItem::from_row)
      .await?
      .into_iter()
      .map(RawItem::into_item)
      .collect()
  }

  async fn get_complement_item(&self, id: Uuid) -> Result<Option<ComplementItem>> {
    let sql = select!(RawItem, "complement_items", "WHERE id = ?1");
    self
      .fetch_one(sql, ids(&[id]), RawItem::from_row)
      .await?
      .map(RawItem::into_item)
      .transpose()
  }

  // ── Customers and orders ──────────────────────────────────────────────────

  async fn find_customer_by_phone(
    &self,
    store_id: Uuid,
    phone: String,
  ) -> Result<Option<Customer>> {
    let sql = select!(
      RawCustomer,
      "customers",
      "WHERE store_id = ?1 AND phone = ?2 ORDER BY created_at, rowid LIMIT 1"
    );
    let mut values = ids(&[store_id]);
    values.push(Value::Text(phone));
    self
      .fetch_one(sql, values, RawCustomer::from_row)
      .await?
      .map(RawCustomer::into_customer)
      .transpose()
  }

  async fn list_customers(&self, store_id: Uuid, wanted: Vec<Uuid>) -> Result<Vec<Customer>> {
    if wanted.is_empty() {
      return Ok(Vec::new());
    }
    let sql = format!(
      "SELECT {} FROM customers WHERE store_id = ? AND id IN {}",
      RawCustomer::COLUMNS,
      in_list(wanted.len())
    );
    let mut values = ids(&[store_id]);
    values.extend(ids(&wanted));
    self
      .fetch_all(sql, values, RawCustomer::from_row)
      .await?
      .into_iter()
      .map(RawCustomer::into_customer)
      .collect()
  }

  async fn list_orders(&self, store_id: Uuid) -> Result<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders WHERE store_id = ?1 ORDER BY created_at DESC, rowid DESC",
      RawOrder::COLUMNS
    );
    self
      .fetch_all(sql, ids(&[store_id]), RawOrder::from_row)
      .await?
      .into_iter()
      .map(RawOrder::into_order)
      .collect()
  }

  async fn get_order(&self, store_id: Uuid, id: Uuid) -> Result<Option<Order>> {
    let sql = select!(RawOrder, "orders", "WHERE id = ?1 AND store_id = ?2");
    self
      .fetch_one(sql, ids(&[id, store_id]), RawOrder::from_row)
      .await?
      .map(RawOrder::into_order)
      .transpose()
  }

  async fn list_order_items(&self, order_ids: Vec<Uuid>) -> Result<Vec<OrderItem>> {
    if order_ids.is_empty() {
      return Ok(Vec::new());
    }
    let sql = format!(
      "SELECT {} FROM order_items WHERE order_id IN {} ORDER BY seq",
      RawOrderItem::COLUMNS,
      in_list(order_ids.len())
    );
    self
      .fetch_all(sql, ids(&order_ids), RawOrderItem::from_row)
      .await?
      .into_iter()
      .map(RawOrderItem::into_item)
      .collect()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn transaction(&self, batch: Vec<Write>) -> Result<()> {
    if batch.is_empty() {
      return Ok(());
    }
    debug!(writes = batch.len(), "applying batch");

    // The inner result carries write failures out of the connection thread
    // after the transaction has been dropped (and so rolled back).
    let outcome: Result<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for w in &batch {
          if let Err(e) = write::apply(&tx, w) {
            return Ok(Err(e));
          }
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    if let Err(e) = &outcome {
      warn!(error = %e, "batch rolled back");
    }
    outcome
  }
}
