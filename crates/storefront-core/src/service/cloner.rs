//! Deep copy of a category: new category, copies of the chosen products and
//! their group links, all in one transaction.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{Category, CategoryDetail, ProductComplement, dedupe},
  repo::{ProductFilter, Repository, Write},
  service::{
    catalog::{category_detail, next_category_position},
    require_store, required_name,
  },
};

/// Create category `name` holding copies of `source_product_ids`.
///
/// Products are copied in input order (repeated ids once). Ids that no
/// longer resolve in the caller's store are skipped. Each copy keeps every
/// attribute of its source except id, category and creation time, and gets
/// the source's links with the same group, order and active flag.
///
/// Returns the new category re-read with its products and groups.
#[instrument(skip(repo, source_product_ids), fields(%store_id, sources = source_product_ids.len()))]
pub async fn duplicate_category<R: Repository>(
  repo: &R,
  store_id: Uuid,
  name: &str,
  source_product_ids: &[Uuid],
) -> Result<CategoryDetail> {
  let name = required_name("name", name)?;
  require_store(repo, store_id).await?;

  let source_ids = dedupe(source_product_ids);
  let sources = if source_ids.is_empty() {
    vec![]
  } else {
    repo
      .list_products(ProductFilter::store(store_id).with_ids(source_ids.clone()))
      .await
      .map_err(Error::persistence)?
  };
  let links = if sources.is_empty() {
    vec![]
  } else {
    repo
      .list_product_complements(sources.iter().map(|p| p.id).collect())
      .await
      .map_err(Error::persistence)?
  };

  let now = Utc::now();
  let category = Category {
    id: Uuid::new_v4(),
    store_id,
    name,
    active: true,
    order: next_category_position(repo, store_id).await?,
    created_at: now,
  };

  let by_id: HashMap<Uuid, _> = sources.iter().map(|p| (p.id, p)).collect();
  let mut batch = vec![Write::InsertCategory(category.clone())];
  let mut copied = 0usize;

  for source in source_ids.iter().filter_map(|id| by_id.get(id)) {
    let mut copy = (*source).clone();
    copy.id = Uuid::new_v4();
    copy.category_id = category.id;
    copy.created_at = now;
    batch.push(Write::InsertProduct(copy.clone()));
    copied += 1;

    batch.extend(
      links
        .iter()
        .filter(|l| l.product_id == source.id)
        .map(|l| {
          Write::InsertProductComplement(ProductComplement {
            id:         Uuid::new_v4(),
            product_id: copy.id,
            group_id:   l.group_id,
            order:      l.order,
            active:     l.active,
          })
        }),
    );
  }

  repo.transaction(batch).await.map_err(Error::persistence)?;
  info!(
    category_id = %category.id,
    copied,
    skipped = source_ids.len() - copied,
    "duplicated category"
  );

  category_detail(repo, category).await
}
