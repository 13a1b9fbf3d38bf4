//! Catalog management: create, list and patch categories and products.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{
    Category, CategoryDetail, CategoryPatch, GroupWithItems, LinkedGroup,
    NestedProduct, NewCategory, NewProduct, Product, ProductChanges,
    ProductDetail, ProductPatch, price_from_cents,
  },
  error::missing,
  image,
  repo::{ProductFilter, Repository, Write},
  service::{
    guard::{link_replacement, new_links, owned_groups},
    required_name,
  },
};

// ─── Categories ──────────────────────────────────────────────────────────────

/// Create a category after the store's last one, with optional nested
/// products, in one transaction.
#[instrument(skip(repo, input), fields(%store_id))]
pub async fn create_category<R: Repository>(
  repo: &R,
  store_id: Uuid,
  input: NewCategory,
) -> Result<CategoryDetail> {
  let name = required_name("name", &input.name)?;
  super::require_store(repo, store_id).await?;

  let category = Category {
    id: Uuid::new_v4(),
    store_id,
    name,
    active: true,
    order: next_category_position(repo, store_id).await?,
    created_at: Utc::now(),
  };

  let products = input
    .products
    .iter()
    .enumerate()
    .map(|(i, p)| nested_product(&category, i, p))
    .collect::<Result<Vec<_>>>()?;

  let mut batch = Vec::with_capacity(products.len() + 1);
  batch.push(Write::InsertCategory(category.clone()));
  batch.extend(products.into_iter().map(Write::InsertProduct));
  repo.transaction(batch).await.map_err(Error::persistence)?;

  info!(category_id = %category.id, "created category");
  category_detail(repo, category).await
}

fn nested_product(
  category: &Category,
  position: usize,
  p: &NestedProduct,
) -> Result<Product> {
  Ok(Product {
    id:          Uuid::new_v4(),
    store_id:    category.store_id,
    category_id: category.id,
    name:        p.name.trim().to_owned(),
    description: p.description.clone().unwrap_or_default(),
    price:       price_from_cents(p.price_in_cents)?,
    image_url:   image::normalize_opt(p.image_url.as_deref()),
    active:      p.active.unwrap_or(true),
    order:       position as i64,
    created_at:  Utc::now(),
  })
}

pub(crate) async fn next_category_position<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<i64> {
  let existing = repo
    .list_categories(store_id)
    .await
    .map_err(Error::persistence)?;
  Ok(existing.iter().map(|c| c.order.saturating_add(1)).max().unwrap_or(0))
}

/// All categories of a store with their products, in display order.
#[instrument(skip(repo), fields(%store_id))]
pub async fn list_categories<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<Vec<CategoryDetail>> {
  categories_with_products(repo, store_id, false).await
}

pub(crate) async fn categories_with_products<R: Repository>(
  repo: &R,
  store_id: Uuid,
  active_only: bool,
) -> Result<Vec<CategoryDetail>> {
  let categories = repo
    .list_categories(store_id)
    .await
    .map_err(Error::persistence)?;

  let mut filter = ProductFilter::store(store_id);
  if active_only {
    filter = filter.active_only();
  }
  let products = repo.list_products(filter).await.map_err(Error::persistence)?;
  let mut details = product_details(repo, store_id, products).await?;

  Ok(
    categories
      .into_iter()
      .filter(|c| !active_only || c.active)
      .map(|category| {
        let (mine, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut details)
          .into_iter()
          .partition(|d| d.product.category_id == category.id);
        details = rest;
        CategoryDetail { category, products: mine }
      })
      .collect(),
  )
}

/// Patch a category; only the fields present change.
#[instrument(skip(repo), fields(%store_id, %id))]
pub async fn update_category<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
  mut patch: CategoryPatch,
) -> Result<Category> {
  if patch.is_empty() {
    return Err(Error::invalid("no fields to update"));
  }
  if let Some(name) = &patch.name {
    patch.name = Some(required_name("name", name)?);
  }
  require_category(repo, store_id, id).await?;

  repo
    .apply(Write::UpdateCategory { store_id, id, patch })
    .await
    .map_err(Error::persistence)?;
  debug!("updated category");
  require_category(repo, store_id, id).await
}

async fn require_category<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
) -> Result<Category> {
  repo
    .get_category(store_id, id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("category", id))
}

/// Load a category's products with their groups.
pub(crate) async fn category_detail<R: Repository>(
  repo: &R,
  category: Category,
) -> Result<CategoryDetail> {
  let products = repo
    .list_products(ProductFilter::store(category.store_id).in_category(category.id))
    .await
    .map_err(Error::persistence)?;
  let products = product_details(repo, category.store_id, products).await?;
  Ok(CategoryDetail { category, products })
}

// ─── Products ────────────────────────────────────────────────────────────────

/// Create a product and its group links in one transaction.
#[instrument(skip(repo, input), fields(%store_id))]
pub async fn create_product<R: Repository>(
  repo: &R,
  store_id: Uuid,
  input: NewProduct,
) -> Result<ProductDetail> {
  let name = required_name("name", &input.name)?;
  let price = price_from_cents(input.price_in_cents)?;
  require_category(repo, store_id, input.category_id).await?;
  let group_ids = owned_groups(repo, store_id, &input.complements).await?;

  let siblings = repo
    .list_products(ProductFilter::store(store_id).in_category(input.category_id))
    .await
    .map_err(Error::persistence)?;

  let product = Product {
    id: Uuid::new_v4(),
    store_id,
    category_id: input.category_id,
    name,
    description: input.description.unwrap_or_default(),
    price,
    image_url: image::normalize_opt(input.image_url.as_deref()),
    active: input.active.unwrap_or(true),
    order: siblings.iter().map(|p| p.order.saturating_add(1)).max().unwrap_or(0),
    created_at: Utc::now(),
  };

  let mut batch = Vec::with_capacity(group_ids.len() + 1);
  batch.push(Write::InsertProduct(product.clone()));
  batch.extend(new_links(product.id, &group_ids).map(Write::InsertProductComplement));
  repo.transaction(batch).await.map_err(Error::persistence)?;

  info!(product_id = %product.id, "created product");
  get_product(repo, store_id, product.id).await
}

/// Active products of a store with category names and linked groups.
#[instrument(skip(repo), fields(%store_id))]
pub async fn list_products<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<Vec<ProductDetail>> {
  let products = repo
    .list_products(ProductFilter::store(store_id).active_only())
    .await
    .map_err(Error::persistence)?;
  product_details(repo, store_id, products).await
}

/// One product with its groups in link order.
#[instrument(skip(repo), fields(%store_id, %id))]
pub async fn get_product<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
) -> Result<ProductDetail> {
  let product = repo
    .get_product(store_id, id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("product", id))?;
  let mut details = product_details(repo, store_id, vec![product]).await?;
  details.pop().ok_or_else(|| missing("product", id))
}

/// Patch a product. Field changes and the optional link replacement commit
/// together.
#[instrument(skip(repo, patch), fields(%store_id, %id))]
pub async fn update_product<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
  patch: ProductPatch,
) -> Result<ProductDetail> {
  repo
    .get_product(store_id, id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("product", id))?;

  let changes = ProductChanges {
    name:        patch
      .name
      .as_deref()
      .map(|n| required_name("name", n))
      .transpose()?,
    description: patch.description,
    price:       patch.price_in_cents.map(price_from_cents).transpose()?,
    category_id: patch.category_id,
    // A malformed URL leaves the stored image untouched.
    image_url:   image::normalize_opt(patch.image_url.as_deref()),
    active:      patch.active,
    order:       patch.order,
  };
  if let Some(category_id) = changes.category_id {
    require_category(repo, store_id, category_id).await?;
  }

  let mut batch = Vec::new();
  if !changes.is_empty() {
    batch.push(Write::UpdateProduct { store_id, id, changes });
  }
  if let Some(groups) = &patch.complements {
    let groups = owned_groups(repo, store_id, groups).await?;
    batch.extend(link_replacement(id, &groups));
  }
  if !batch.is_empty() {
    repo.transaction(batch).await.map_err(Error::persistence)?;
  }

  debug!("updated product");
  get_product(repo, store_id, id).await
}

/// Attach category names and linked groups (with options) to products,
/// preserving the input order.
pub(crate) async fn product_details<R: Repository>(
  repo: &R,
  store_id: Uuid,
  products: Vec<Product>,
) -> Result<Vec<ProductDetail>> {
  if products.is_empty() {
    return Ok(vec![]);
  }

  let categories: HashMap<Uuid, String> = repo
    .list_categories(store_id)
    .await
    .map_err(Error::persistence)?
    .into_iter()
    .map(|c| (c.id, c.name))
    .collect();

  let links = repo
    .list_product_complements(products.iter().map(|p| p.id).collect())
    .await
    .map_err(Error::persistence)?;

  let groups = repo
    .list_complement_groups(store_id)
    .await
    .map_err(Error::persistence)?;
  let items = repo
    .list_complement_items(groups.iter().map(|g| g.id).collect())
    .await
    .map_err(Error::persistence)?;

  let groups: HashMap<Uuid, GroupWithItems> = groups
    .into_iter()
    .map(|group| {
      let items = items.iter().filter(|i| i.group_id == group.id).cloned().collect();
      (group.id, GroupWithItems { group, items })
    })
    .collect();

  Ok(
    products
      .into_iter()
      .map(|product| {
        let complements = links
          .iter()
          .filter(|l| l.product_id == product.id)
          .filter_map(|l| {
            groups.get(&l.group_id).map(|g| LinkedGroup {
              order:  l.order,
              active: l.active,
              group:  g.clone(),
            })
          })
          .collect();
        ProductDetail {
          category_name: categories.get(&product.category_id).cloned(),
          product,
          complements,
        }
      })
      .collect(),
  )
}
