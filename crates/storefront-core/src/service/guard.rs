//! Integrity guard for destructive catalog operations.
//!
//! The store does not cascade deletes, so link rows and options are removed
//! explicitly and in dependency order. Deletes that could orphan order history
//! carry a [`Write::RequireUnreferenced`] guard in the same batch, which turns
//! a reference found at commit time into a `Conflict` with nothing written.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{ProductComplement, dedupe},
  error::missing,
  repo::{GatewayError, ProductFilter, ProductScope, Repository, Write},
};

const REFERENCED_BY_ORDERS: &str = "referenced by existing orders";

/// Delete a product and its group links, unless an order item references it.
#[instrument(skip(repo), fields(%store_id, %id))]
pub async fn delete_product<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
) -> Result<()> {
  repo
    .get_product(store_id, id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("product", id))?;

  let scope = ProductScope::Ids(vec![id]);
  let batch = vec![
    Write::RequireUnreferenced(scope.clone()),
    Write::DeleteProductComplements(scope.clone()),
    Write::DeleteProducts { store_id, scope },
  ];
  repo
    .transaction(batch)
    .await
    .map_err(|e| guarded("product", e))?;

  info!("deleted product");
  Ok(())
}

/// Delete a group: its product links, then its options, then the group.
///
/// Orders keep their own complement snapshot, so no reference check applies.
#[instrument(skip(repo), fields(%store_id, %id))]
pub async fn delete_complement_group<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
) -> Result<()> {
  repo
    .get_complement_group(store_id, id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("complement group", id))?;

  let batch = vec![
    Write::DeleteGroupLinks { group_id: id },
    Write::DeleteComplementItems { group_id: id, keep: vec![] },
    Write::DeleteComplementGroup { store_id, id },
  ];
  repo.transaction(batch).await.map_err(Error::persistence)?;

  info!("deleted complement group");
  Ok(())
}

/// Delete a category together with its products and their links.
///
/// All-or-nothing: if any product of the category is referenced by an order,
/// nothing is deleted.
#[instrument(skip(repo), fields(%store_id, %id))]
pub async fn delete_category<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
) -> Result<()> {
  repo
    .get_category(store_id, id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("category", id))?;

  let products = repo
    .list_products(ProductFilter::store(store_id).in_category(id))
    .await
    .map_err(Error::persistence)?;

  // Statements are scoped by category rather than by the ids just read, so a
  // product added in the meantime is covered by the same guard.
  let scope = ProductScope::Category(id);
  let mut batch = Vec::with_capacity(4);
  if !products.is_empty() {
    batch.push(Write::RequireUnreferenced(scope.clone()));
  }
  batch.push(Write::DeleteProductComplements(scope.clone()));
  batch.push(Write::DeleteProducts { store_id, scope });
  batch.push(Write::DeleteCategory { store_id, id });

  repo
    .transaction(batch)
    .await
    .map_err(|e| guarded("category", e))?;

  info!(products = products.len(), "deleted category");
  Ok(())
}

/// Delete a single option; the group, its other options and product links
/// are left alone.
#[instrument(skip(repo), fields(%store_id, %id))]
pub async fn delete_complement_item<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
) -> Result<()> {
  let item = repo
    .get_complement_item(id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("complement item", id))?;

  // Options have no store column; ownership goes through the group.
  repo
    .get_complement_group(store_id, item.group_id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("complement item", id))?;

  repo
    .apply(Write::DeleteComplementItem { group_id: item.group_id, id })
    .await
    .map_err(Error::persistence)?;
  info!("deleted complement item");
  Ok(())
}

/// Replace a product's group links with `group_ids` (deduplicated, order =
/// position). An empty list clears all links.
#[instrument(skip(repo, group_ids), fields(%store_id, %product_id))]
pub async fn replace_complement_links<R: Repository>(
  repo: &R,
  store_id: Uuid,
  product_id: Uuid,
  group_ids: &[Uuid],
) -> Result<Vec<Uuid>> {
  repo
    .get_product(store_id, product_id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("product", product_id))?;

  let group_ids = owned_groups(repo, store_id, group_ids).await?;
  let batch = link_replacement(product_id, &group_ids);
  repo.transaction(batch).await.map_err(Error::persistence)?;
  Ok(group_ids)
}

/// Deduplicate `group_ids` and check that every group belongs to the store.
pub(crate) async fn owned_groups<R: Repository>(
  repo: &R,
  store_id: Uuid,
  group_ids: &[Uuid],
) -> Result<Vec<Uuid>> {
  let group_ids = dedupe(group_ids);
  if group_ids.is_empty() {
    return Ok(group_ids);
  }
  let known = repo
    .list_complement_groups(store_id)
    .await
    .map_err(Error::persistence)?;
  if let Some(unknown) = group_ids
    .iter()
    .find(|id| !known.iter().any(|g| g.id == **id))
  {
    return Err(missing("complement group", *unknown));
  }
  Ok(group_ids)
}

/// Delete-all-then-recreate statements for a product's links. Link ids are
/// not stable across replacements.
pub(crate) fn link_replacement(product_id: Uuid, group_ids: &[Uuid]) -> Vec<Write> {
  let mut batch = Vec::with_capacity(group_ids.len() + 1);
  batch.push(Write::DeleteProductComplements(ProductScope::Ids(vec![product_id])));
  batch.extend(new_links(product_id, group_ids).map(Write::InsertProductComplement));
  batch
}

pub(crate) fn new_links(
  product_id: Uuid,
  group_ids: &[Uuid],
) -> impl Iterator<Item = ProductComplement> + '_ {
  group_ids.iter().enumerate().map(move |(i, group_id)| ProductComplement {
    id: Uuid::new_v4(),
    product_id,
    group_id: *group_id,
    order: i as i64,
    active: true,
  })
}

fn guarded<E: GatewayError>(entity: &str, e: E) -> Error {
  if e.is_referenced() {
    info!(entity, "delete blocked by order references");
    Error::Conflict(format!("{entity} is {REFERENCED_BY_ORDERS}"))
  } else {
    Error::persistence(e)
  }
}
