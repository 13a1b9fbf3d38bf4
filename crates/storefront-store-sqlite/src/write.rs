//! Translation of [`Write`] values into SQL statements inside an open
//! transaction.
//!
//! Every update and delete of a store-owned row is filtered by `store_id`.
//! Partial updates build their `SET` list from the fields that are present.

use rusqlite::{Transaction, params, params_from_iter, types::Value};
use storefront_core::repo::{Positioned, ProductScope, Write};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    encode_decimal, encode_dt, encode_kind, encode_opt_dt, encode_snapshot,
    encode_status, encode_uuid,
  },
};

// ─── Dynamic SQL helpers ─────────────────────────────────────────────────────

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

fn id(id: Uuid) -> Value { Value::Text(encode_uuid(id)) }

/// `(?, ?, ?)` with `n` placeholders; `(NULL)` when `n == 0` so the list
/// matches nothing.
fn placeholders(n: usize) -> String {
  if n == 0 {
    return "(NULL)".to_owned();
  }
  let mut s = String::with_capacity(n * 3 + 1);
  s.push('(');
  for i in 0..n {
    if i > 0 {
      s.push_str(", ");
    }
    s.push('?');
  }
  s.push(')');
  s
}

/// A `product_id IN (...)`-style predicate over `column` for `scope`.
fn scope_predicate(column: &str, scope: &ProductScope) -> (String, Vec<Value>) {
  match scope {
    ProductScope::Ids(ids) => (
      format!("{column} IN {}", placeholders(ids.len())),
      ids.iter().copied().map(id).collect(),
    ),
    ProductScope::Category(category_id) => (
      format!("{column} IN (SELECT id FROM products WHERE category_id = ?)"),
      vec![id(*category_id)],
    ),
  }
}

/// Accumulates `column = ?` assignments for a partial update.
#[derive(Default)]
struct SetList {
  columns: Vec<&'static str>,
  values:  Vec<Value>,
}

impl SetList {
  fn set(&mut self, column: &'static str, value: Option<Value>) -> &mut Self {
    if let Some(v) = value {
      self.columns.push(column);
      self.values.push(v);
    }
    self
  }

  /// Run `UPDATE {table} SET ... WHERE {filter}`; a no-op when nothing is
  /// set.
  fn execute(
    self,
    tx: &Transaction<'_>,
    table: &str,
    filter: &str,
    keys: Vec<Value>,
  ) -> Result<()> {
    if self.columns.is_empty() {
      return Ok(());
    }
    let assignments = self
      .columns
      .iter()
      .map(|c| format!("{c} = ?"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!("UPDATE {table} SET {assignments} WHERE {filter}");
    tx.execute(&sql, params_from_iter(self.values.into_iter().chain(keys)))?;
    Ok(())
  }
}

// ─── Apply ───────────────────────────────────────────────────────────────────

/// Execute one write. An `Err` leaves the transaction to be rolled back by
/// the caller.
pub fn apply(tx: &Transaction<'_>, write: &Write) -> Result<()> {
  match write {
    // ── Stores and settings ─────────────────────────────────────────────
    Write::InsertStore(s) => {
      tx.execute(
        "INSERT INTO stores (id, user_id, name, subdomain, description, logo_url,
                             cover_image, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
          encode_uuid(s.id),
          encode_uuid(s.user_id),
          s.name,
          s.subdomain,
          s.description,
          s.logo_url,
          s.cover_image,
          s.address,
          encode_dt(s.created_at),
        ],
      )?;
    }

    Write::UpdateStoreProfile { store_id, patch } => {
      let mut set = SetList::default();
      set
        .set("name", patch.name.clone().map(text))
        .set("description", patch.description.clone().map(text))
        .set("logo_url", patch.logo_url.clone().map(text))
        .set("cover_image", patch.cover_image.clone().map(text))
        .set("address", patch.address.clone().map(text));
      set.execute(tx, "stores", "id = ?", vec![id(*store_id)])?;
    }

    Write::SetSubdomain { store_id, subdomain } => {
      tx.execute(
        "UPDATE stores SET subdomain = ?1 WHERE id = ?2",
        params![subdomain, encode_uuid(*store_id)],
      )?;
    }

    Write::InsertSettings(s) => {
      tx.execute(
        "INSERT INTO store_settings (id, store_id, is_open, open_time, close_time,
                                     delivery_fee, min_order_value, estimated_time,
                                     whatsapp, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
          encode_uuid(s.id),
          encode_uuid(s.store_id),
          s.is_open,
          s.open_time,
          s.close_time,
          encode_decimal(s.delivery_fee),
          encode_decimal(s.min_order_value),
          s.estimated_time,
          s.whatsapp,
          encode_dt(s.created_at),
          encode_dt(s.updated_at),
        ],
      )?;
    }

    Write::UpdateSettings(s) => {
      tx.execute(
        "UPDATE store_settings
         SET is_open = ?1, open_time = ?2, close_time = ?3, delivery_fee = ?4,
             min_order_value = ?5, estimated_time = ?6, whatsapp = ?7,
             updated_at = ?8
         WHERE store_id = ?9",
        params![
          s.is_open,
          s.open_time,
          s.close_time,
          encode_decimal(s.delivery_fee),
          encode_decimal(s.min_order_value),
          s.estimated_time,
          s.whatsapp,
          encode_dt(s.updated_at),
          encode_uuid(s.store_id),
        ],
      )?;
    }

    // ── Categories ──────────────────────────────────────────────────────
    Write::InsertCategory(c) => {
      tx.execute(
        "INSERT INTO categories (id, store_id, name, active, position, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
          encode_uuid(c.id),
          encode_uuid(c.store_id),
          c.name,
          c.active,
          c.order,
          encode_dt(c.created_at),
        ],
      )?;
    }

    Write::UpdateCategory { store_id, id: category_id, patch } => {
      let mut set = SetList::default();
      set
        .set("name", patch.name.clone().map(text))
        .set("active", patch.active.map(|v| Value::Integer(v.into())))
        .set("position", patch.order.map(Value::Integer));
      set.execute(
        tx,
        "categories",
        "id = ? AND store_id = ?",
        vec![id(*category_id), id(*store_id)],
      )?;
    }

    Write::DeleteCategory { store_id, id: category_id } => {
      tx.execute(
        "DELETE FROM categories WHERE id = ?1 AND store_id = ?2",
        params![encode_uuid(*category_id), encode_uuid(*store_id)],
      )?;
    }

    // ── Products ────────────────────────────────────────────────────────
    Write::InsertProduct(p) => {
      tx.execute(
        "INSERT INTO products (id, store_id, category_id, name, description, price,
                               image_url, active, position, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
          encode_uuid(p.id),
          encode_uuid(p.store_id),
          encode_uuid(p.category_id),
          p.name,
          p.description,
          encode_decimal(p.price),
          p.image_url,
          p.active,
          p.order,
          encode_dt(p.created_at),
        ],
      )?;
    }

    Write::UpdateProduct { store_id, id: product_id, changes } => {
      let mut set = SetList::default();
      set
        .set("name", changes.name.clone().map(text))
        .set("description", changes.description.clone().map(text))
        .set("price", changes.price.map(|p| text(encode_decimal(p))))
        .set("category_id", changes.category_id.map(id))
        .set("image_url", changes.image_url.clone().map(text))
        .set("active", changes.active.map(|v| Value::Integer(v.into())))
        .set("position", changes.order.map(Value::Integer));
      set.execute(
        tx,
        "products",
        "id = ? AND store_id = ?",
        vec![id(*product_id), id(*store_id)],
      )?;
    }

    Write::DeleteProducts { store_id, scope } => {
      let (predicate, mut values) = scope_predicate("id", scope);
      values.push(id(*store_id));
      tx.execute(
        &format!("DELETE FROM products WHERE {predicate} AND store_id = ?"),
        params_from_iter(values),
      )?;
    }

    // ── Product/group links ─────────────────────────────────────────────
    Write::InsertProductComplement(l) => {
      tx.execute(
        "INSERT INTO product_complements (id, product_id, group_id, position, active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
          encode_uuid(l.id),
          encode_uuid(l.product_id),
          encode_uuid(l.group_id),
          l.order,
          l.active,
        ],
      )?;
    }

    Write::DeleteProductComplements(scope) => {
      let (predicate, values) = scope_predicate("product_id", scope);
      tx.execute(
        &format!("DELETE FROM product_complements WHERE {predicate}"),
        params_from_iter(values),
      )?;
    }

    Write::DeleteGroupLinks { group_id } => {
      tx.execute(
        "DELETE FROM product_complements WHERE group_id = ?1",
        params![encode_uuid(*group_id)],
      )?;
    }

    // ── Complement groups and options ───────────────────────────────────
    Write::InsertComplementGroup(g) => {
      tx.execute(
        "INSERT INTO complement_groups (id, store_id, name, description, required,
                                        min_select, max_select, kind, active,
                                        created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
          encode_uuid(g.id),
          encode_uuid(g.store_id),
          g.name,
          g.description,
          g.required,
          g.min,
          g.max,
          encode_kind(g.kind),
          g.active,
          encode_dt(g.created_at),
        ],
      )?;
    }

    Write::UpdateComplementGroup { store_id, id: group_id, changes } => {
      let mut set = SetList::default();
      set
        .set("name", changes.name.clone().map(text))
        .set("description", changes.description.clone().map(text))
        .set("required", changes.required.map(|v| Value::Integer(v.into())))
        .set("min_select", changes.min.map(|v| Value::Integer(v.into())))
        .set("max_select", changes.max.map(|v| Value::Integer(v.into())))
        .set("kind", changes.kind.map(|k| text(encode_kind(k))))
        .set("active", changes.active.map(|v| Value::Integer(v.into())));
      set.execute(
        tx,
        "complement_groups",
        "id = ? AND store_id = ?",
        vec![id(*group_id), id(*store_id)],
      )?;
    }

    Write::DeleteComplementGroup { store_id, id: group_id } => {
      tx.execute(
        "DELETE FROM complement_groups WHERE id = ?1 AND store_id = ?2",
        params![encode_uuid(*group_id), encode_uuid(*store_id)],
      )?;
    }

    Write::InsertComplementItem(i) => {
      tx.execute(
        "INSERT INTO complement_items (id, group_id, name, price, active, image_url,
                                       description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
          encode_uuid(i.id),
          encode_uuid(i.group_id),
          i.name,
          encode_decimal(i.price),
          i.active,
          i.image_url,
          i.description,
          encode_dt(i.created_at),
        ],
      )?;
    }

    Write::UpdateComplementItem(i) => {
      tx.execute(
        "UPDATE complement_items
         SET name = ?1, price = ?2, active = ?3, image_url = ?4, description = ?5
         WHERE id = ?6 AND group_id = ?7",
        params![
          i.name,
          encode_decimal(i.price),
          i.active,
          i.image_url,
          i.description,
          encode_uuid(i.id),
          encode_uuid(i.group_id),
        ],
      )?;
    }

    Write::DeleteComplementItems { group_id, keep } => {
      let mut values = vec![id(*group_id)];
      let sql = if keep.is_empty() {
        "DELETE FROM complement_items WHERE group_id = ?".to_owned()
      } else {
        values.extend(keep.iter().copied().map(id));
        format!(
          "DELETE FROM complement_items WHERE group_id = ? AND id NOT IN {}",
          placeholders(keep.len())
        )
      };
      tx.execute(&sql, params_from_iter(values))?;
    }

    Write::DeleteComplementItem { group_id, id: item_id } => {
      tx.execute(
        "DELETE FROM complement_items WHERE id = ?1 AND group_id = ?2",
        params![encode_uuid(*item_id), encode_uuid(*group_id)],
      )?;
    }

    // ── Customers and orders ────────────────────────────────────────────
    Write::InsertCustomer(c) => {
      tx.execute(
        "INSERT INTO customers (id, store_id, name, phone, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
          encode_uuid(c.id),
          encode_uuid(c.store_id),
          c.name,
          c.phone,
          c.address,
          encode_dt(c.created_at),
        ],
      )?;
    }

    Write::InsertOrder(o) => {
      tx.execute(
        "INSERT INTO orders (id, store_id, customer_id, status, total, payment_method,
                             delivery_fee, created_at, finalized_at, canceled_at,
                             cancel_reason, canceled_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
          encode_uuid(o.id),
          encode_uuid(o.store_id),
          o.customer_id.map(encode_uuid),
          encode_status(o.status),
          encode_decimal(o.total),
          o.payment_method,
          encode_decimal(o.delivery_fee),
          encode_dt(o.created_at),
          encode_opt_dt(o.finalized_at),
          encode_opt_dt(o.canceled_at),
          o.cancel_reason,
          o.canceled_by,
        ],
      )?;
    }

    Write::InsertOrderItem(i) => {
      tx.execute(
        "INSERT INTO order_items (id, order_id, product_id, quantity, unit_price,
                                  complements)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
          encode_uuid(i.id),
          encode_uuid(i.order_id),
          encode_uuid(i.product_id),
          i.quantity,
          encode_decimal(i.unit_price),
          encode_snapshot(&i.complements)?,
        ],
      )?;
    }

    Write::SetOrderStatus {
      store_id,
      id: order_id,
      expected,
      status,
      finalized_at,
      canceled_at,
      cancel_reason,
      canceled_by,
    } => {
      let changed = tx.execute(
        "UPDATE orders
         SET status = ?1, finalized_at = ?2, canceled_at = ?3, cancel_reason = ?4,
             canceled_by = ?5
         WHERE id = ?6 AND store_id = ?7 AND status = ?8",
        params![
          encode_status(*status),
          encode_opt_dt(*finalized_at),
          encode_opt_dt(*canceled_at),
          cancel_reason,
          canceled_by,
          encode_uuid(*order_id),
          encode_uuid(*store_id),
          encode_status(*expected),
        ],
      )?;
      if changed == 0 {
        return Err(Error::Stale { id: *order_id });
      }
    }

    // ── Ordering and guards ─────────────────────────────────────────────
    Write::SetPosition { kind, store_id, id: row_id, position } => {
      let table = match kind {
        Positioned::Category => "categories",
        Positioned::Product => "products",
      };
      tx.execute(
        &format!("UPDATE {table} SET position = ?1 WHERE id = ?2 AND store_id = ?3"),
        params![position, encode_uuid(*row_id), encode_uuid(*store_id)],
      )?;
    }

    Write::RequireUnreferenced(scope) => {
      let (predicate, values) = scope_predicate("product_id", scope);
      let count: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM order_items WHERE {predicate}"),
        params_from_iter(values),
        |r| r.get(0),
      )?;
      if count > 0 {
        return Err(Error::Referenced { count: count.unsigned_abs() });
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn placeholder_lists() {
    assert_eq!(placeholders(0), "(NULL)");
    assert_eq!(placeholders(1), "(?)");
    assert_eq!(placeholders(3), "(?, ?, ?)");
  }

  #[test]
  fn category_scope_is_a_subquery() {
    let (sql, values) = scope_predicate("product_id", &ProductScope::Category(Uuid::nil()));
    assert!(sql.contains("SELECT id FROM products WHERE category_id = ?"));
    assert_eq!(values.len(), 1);
  }
}
