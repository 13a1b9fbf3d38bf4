//! Order lifecycle engine: creation with snapshotting, the status state
//! machine, and read-side normalisation.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
  Error, Result,
  error::missing,
  order::{
    CUSTOMER_PLACEHOLDER_NAME, ComplementInput, Customer, CustomerInfo,
    DEFAULT_CANCEL_ACTOR, DEFAULT_CANCEL_REASON, NewOrder, Order, OrderItem, OrderStatus,
    OrderView, line_total,
  },
  repo::{GatewayError, ProductFilter, Repository, Write},
  service::require_store,
  tenant::non_empty,
};

// ─── Create ──────────────────────────────────────────────────────────────────

/// Create an order with status `NEW`.
///
/// Input is validated before anything is written. The customer is found by
/// phone or created first; the order row and every item row then commit in a
/// single transaction. The caller-computed `total` and per-item unit prices are
/// stored as given.
#[instrument(skip(repo, input), fields(%store_id, items = input.items.len()))]
pub async fn create_order<R: Repository>(
  repo: &R,
  store_id: Uuid,
  input: NewOrder,
) -> Result<OrderView> {
  validate(&input)?;
  require_store(repo, store_id).await?;
  check_products(repo, store_id, &input).await?;

  let customer = match &input.customer {
    Some(info) => resolve_customer(repo, store_id, info).await?,
    None => None,
  };

  let order = Order {
    id:             Uuid::new_v4(),
    store_id,
    customer_id:    customer.as_ref().map(|c| c.id),
    status:         OrderStatus::New,
    total:          input.total,
    payment_method: input.payment_method.as_deref().and_then(non_empty),
    delivery_fee:   input.delivery_fee.unwrap_or(Decimal::ZERO),
    created_at:     Utc::now(),
    finalized_at:   None,
    canceled_at:    None,
    cancel_reason:  None,
    canceled_by:    None,
  };

  let items: Vec<OrderItem> = input
    .items
    .into_iter()
    .map(|item| OrderItem {
      id:          Uuid::new_v4(),
      order_id:    order.id,
      product_id:  item.product_id,
      quantity:    coerced_quantity(item.quantity),
      unit_price:  item.unit_price,
      complements: item
        .complements
        .into_iter()
        .map(|c| c.into_snapshot())
        .collect(),
    })
    .collect();

  let mut batch = Vec::with_capacity(items.len() + 1);
  batch.push(Write::InsertOrder(order.clone()));
  batch.extend(items.iter().cloned().map(Write::InsertOrderItem));
  repo
    .transaction(batch)
    .await
    .map_err(|e| Error::OrderProcessing(Box::new(e)))?;

  info!(order_id = %order.id, total = %order.total, "created order");
  let order_id = order.id;
  normalize(repo, store_id, vec![order])
    .await?
    .pop()
    .ok_or_else(|| missing("order", order_id))
}

fn validate(input: &NewOrder) -> Result<()> {
  if input.items.is_empty() {
    return Err(Error::invalid("order has no items"));
  }
  if input.total <= Decimal::ZERO {
    return Err(Error::invalid("total must be positive"));
  }
  if input.delivery_fee.is_some_and(|f| f.is_sign_negative()) {
    return Err(Error::invalid("delivery fee must not be negative"));
  }
  if input.items.iter().any(|i| i.unit_price.is_sign_negative()) {
    return Err(Error::invalid("unit price must not be negative"));
  }
  // Line totals are derived on every read, so they must stay computable.
  for item in &input.items {
    let complements: Vec<_> = item
      .complements
      .iter()
      .cloned()
      .map(ComplementInput::into_snapshot)
      .collect();
    if line_total(item.unit_price, coerced_quantity(item.quantity), &complements).is_none() {
      return Err(Error::invalid("item total is out of range"));
    }
  }
  Ok(())
}

/// Missing or zero quantities count as one.
fn coerced_quantity(quantity: Option<u32>) -> u32 {
  quantity.filter(|q| *q > 0).unwrap_or(1)
}

/// Every item must name a product of this store.
async fn check_products<R: Repository>(
  repo: &R,
  store_id: Uuid,
  input: &NewOrder,
) -> Result<()> {
  let wanted: HashSet<Uuid> = input.items.iter().map(|i| i.product_id).collect();
  let found: HashSet<Uuid> = repo
    .list_products(ProductFilter::store(store_id).with_ids(wanted.iter().copied().collect()))
    .await
    .map_err(Error::persistence)?
    .into_iter()
    .map(|p| p.id)
    .collect();

  match wanted.difference(&found).next() {
    Some(unknown) => Err(Error::invalid(format!("unknown product: {unknown}"))),
    None => Ok(()),
  }
}

/// Find-or-create by `(store_id, phone)`.
///
/// Read-then-create: two concurrent first orders from the same phone may
/// create two customers, as phone is not declared unique.
async fn resolve_customer<R: Repository>(
  repo: &R,
  store_id: Uuid,
  info: &CustomerInfo,
) -> Result<Option<Customer>> {
  let Some(phone) = info.phone.as_deref().and_then(non_empty) else {
    return Ok(None);
  };

  if let Some(existing) = repo
    .find_customer_by_phone(store_id, phone.clone())
    .await
    .map_err(|e| Error::OrderProcessing(Box::new(e)))?
  {
    return Ok(Some(existing));
  }

  let customer = Customer {
    id: Uuid::new_v4(),
    store_id,
    name: info
      .name
      .as_deref()
      .and_then(non_empty)
      .unwrap_or_else(|| CUSTOMER_PLACEHOLDER_NAME.to_owned()),
    phone,
    address: info.address.as_deref().and_then(non_empty),
    created_at: Utc::now(),
  };
  repo
    .apply(Write::InsertCustomer(customer.clone()))
    .await
    .map_err(|e| Error::OrderProcessing(Box::new(e)))?;
  debug!(customer_id = %customer.id, "created customer");
  Ok(Some(customer))
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Move an order to the state named by `label`.
///
/// `finished` stamps `finalized_at` and clears cancellation fields;
/// `canceled` stamps `canceled_at` and records reason and actor (with
/// defaults). Other states set no timestamps. Status and timestamps are one
/// write.
#[instrument(skip(repo, reason, actor), fields(%store_id, %order_id))]
pub async fn set_status<R: Repository>(
  repo: &R,
  store_id: Uuid,
  order_id: Uuid,
  label: &str,
  reason: Option<&str>,
  actor: Option<&str>,
) -> Result<OrderView> {
  let next = OrderStatus::from_label(label)
    .ok_or_else(|| Error::invalid(format!("unknown status: {label:?}")))?;

  let order = repo
    .get_order(store_id, order_id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("order", order_id))?;

  if !order.status.can_transition_to(next) {
    return Err(Error::invalid(format!(
      "cannot move order from {} to {}",
      order.status.label(),
      next.label()
    )));
  }

  let now = Utc::now();
  let write = match next {
    OrderStatus::Finished => Write::SetOrderStatus {
      store_id,
      id: order_id,
      expected: order.status,
      status: next,
      finalized_at: Some(now),
      canceled_at: None,
      cancel_reason: None,
      canceled_by: None,
    },
    OrderStatus::Canceled => Write::SetOrderStatus {
      store_id,
      id: order_id,
      expected: order.status,
      status: next,
      finalized_at: order.finalized_at,
      canceled_at: Some(now),
      cancel_reason: Some(
        reason
          .and_then(non_empty)
          .unwrap_or_else(|| DEFAULT_CANCEL_REASON.to_owned()),
      ),
      canceled_by: Some(
        actor
          .and_then(non_empty)
          .unwrap_or_else(|| DEFAULT_CANCEL_ACTOR.to_owned()),
      ),
    },
    _ => Write::SetOrderStatus {
      store_id,
      id: order_id,
      expected: order.status,
      status: next,
      finalized_at: order.finalized_at,
      canceled_at: order.canceled_at,
      cancel_reason: order.cancel_reason.clone(),
      canceled_by: order.canceled_by.clone(),
    },
  };
  repo.apply(write).await.map_err(|e| {
    if e.is_stale() {
      Error::Conflict(format!("order {order_id} changed status concurrently"))
    } else {
      Error::persistence(e)
    }
  })?;
  info!(from = order.status.label(), to = next.label(), "order status changed");

  get_order(repo, store_id, order_id).await
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Orders of a store, newest first, normalised for display.
#[instrument(skip(repo), fields(%store_id))]
pub async fn list_orders<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<Vec<OrderView>> {
  let orders = repo.list_orders(store_id).await.map_err(Error::persistence)?;
  normalize(repo, store_id, orders).await
}

#[instrument(skip(repo), fields(%store_id, %order_id))]
pub async fn get_order<R: Repository>(
  repo: &R,
  store_id: Uuid,
  order_id: Uuid,
) -> Result<OrderView> {
  let order = repo
    .get_order(store_id, order_id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("order", order_id))?;
  normalize(repo, store_id, vec![order])
    .await?
    .pop()
    .ok_or_else(|| missing("order", order_id))
}

/// Attach customers, items and product names, and derive line totals.
async fn normalize<R: Repository>(
  repo: &R,
  store_id: Uuid,
  orders: Vec<Order>,
) -> Result<Vec<OrderView>> {
  if orders.is_empty() {
    return Ok(vec![]);
  }

  let customer_ids: Vec<Uuid> = orders
    .iter()
    .filter_map(|o| o.customer_id)
    .collect::<HashSet<_>>()
    .into_iter()
    .collect();
  let customers: HashMap<Uuid, Customer> = if customer_ids.is_empty() {
    HashMap::new()
  } else {
    repo
      .list_customers(store_id, customer_ids)
      .await
      .map_err(Error::persistence)?
      .into_iter()
      .map(|c| (c.id, c))
      .collect()
  };

  let items = repo
    .list_order_items(orders.iter().map(|o| o.id).collect())
    .await
    .map_err(Error::persistence)?;

  let product_ids: Vec<Uuid> = items
    .iter()
    .map(|i| i.product_id)
    .collect::<HashSet<_>>()
    .into_iter()
    .collect();
  let names: HashMap<Uuid, String> = repo
    .list_products(ProductFilter::store(store_id).with_ids(product_ids))
    .await
    .map_err(Error::persistence)?
    .into_iter()
    .map(|p| (p.id, p.name))
    .collect();

  let mut by_order: HashMap<Uuid, Vec<(OrderItem, Option<String>)>> = HashMap::new();
  for item in items {
    let name = names.get(&item.product_id).cloned();
    by_order.entry(item.order_id).or_default().push((item, name));
  }

  Ok(
    orders
      .into_iter()
      .map(|order| {
        let customer = order.customer_id.and_then(|id| customers.get(&id));
        let items = by_order.remove(&order.id).unwrap_or_default();
        OrderView::build(order, customer, items)
      })
      .collect(),
  )
}
