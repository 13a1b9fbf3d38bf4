//! Handlers for categories and products.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/categories` | With products, display order |
//! | `POST`   | `/categories` | Body: `{"name":..., "products":[...]}` |
//! | `PUT`    | `/categories/order` | Body: `{"ids":[...]}` |
//! | `POST`   | `/categories/duplicate` | Body: `{"name":..., "productIds":[...]}` |
//! | `PATCH`  | `/categories/{id}` | |
//! | `DELETE` | `/categories/{id}` | 409 if a product is in an order |
//! | `GET`    | `/products` | Active products |
//! | `POST`   | `/products` | Price in `priceInCents` |
//! | `PUT`    | `/products/order` | Body: `{"ids":[...]}` |
//! | `GET`    | `/products/{id}` | |
//! | `PATCH`  | `/products/{id}` | |
//! | `DELETE` | `/products/{id}` | 409 if in an order |
//! | `PUT`    | `/products/{id}/complements` | Body: `{"groupIds":[...]}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use storefront_core::{
  catalog::{
    Category, CategoryDetail, CategoryPatch, NewCategory, NewProduct, ProductDetail,
    ProductPatch,
  },
  repo::{Positioned, Repository},
  service::{catalog, cloner, guard, reorder},
};
use uuid::Uuid;

use crate::{error::Result, identity::CallerIdentity};

#[derive(Debug, Deserialize)]
pub struct ReorderBody {
  pub ids: Vec<Uuid>,
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// `GET /categories`
pub async fn list_categories<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
) -> Result<Json<Vec<CategoryDetail>>> {
  Ok(Json(catalog::list_categories(repo.as_ref(), caller.store_id).await?))
}

/// `POST /categories`
pub async fn create_category<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<NewCategory>,
) -> Result<impl IntoResponse> {
  let detail = catalog::create_category(repo.as_ref(), caller.store_id, body).await?;
  Ok((StatusCode::CREATED, Json(detail)))
}

/// `PATCH /categories/{id}`
pub async fn update_category<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
  Json(patch): Json<CategoryPatch>,
) -> Result<Json<Category>> {
  let category = catalog::update_category(repo.as_ref(), caller.store_id, id, patch).await?;
  Ok(Json(category))
}

/// `DELETE /categories/{id}`
pub async fn delete_category<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode> {
  guard::delete_category(repo.as_ref(), caller.store_id, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /categories/order`
pub async fn reorder_categories<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<ReorderBody>,
) -> Result<StatusCode> {
  reorder::reorder(repo.as_ref(), Positioned::Category, caller.store_id, &body.ids).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateBody {
  pub name:        String,
  #[serde(default)]
  pub product_ids: Vec<Uuid>,
}

/// `POST /categories/duplicate`
pub async fn duplicate_category<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<DuplicateBody>,
) -> Result<impl IntoResponse> {
  let detail =
    cloner::duplicate_category(repo.as_ref(), caller.store_id, &body.name, &body.product_ids)
      .await?;
  Ok((StatusCode::CREATED, Json(detail)))
}

// ─── Products ────────────────────────────────────────────────────────────────

/// `GET /products`
pub async fn list_products<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
) -> Result<Json<Vec<ProductDetail>>> {
  Ok(Json(catalog::list_products(repo.as_ref(), caller.store_id).await?))
}

/// `POST /products`
pub async fn create_product<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<NewProduct>,
) -> Result<impl IntoResponse> {
  let detail = catalog::create_product(repo.as_ref(), caller.store_id, body).await?;
  Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /products/{id}`
pub async fn get_product<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<ProductDetail>> {
  Ok(Json(catalog::get_product(repo.as_ref(), caller.store_id, id).await?))
}

/// `PATCH /products/{id}`
pub async fn update_product<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
  Json(patch): Json<ProductPatch>,
) -> Result<Json<ProductDetail>> {
  let detail = catalog::update_product(repo.as_ref(), caller.store_id, id, patch).await?;
  Ok(Json(detail))
}

/// `DELETE /products/{id}`
pub async fn delete_product<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode> {
  guard::delete_product(repo.as_ref(), caller.store_id, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /products/order`
pub async fn reorder_products<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<ReorderBody>,
) -> Result<StatusCode> {
  reorder::reorder(repo.as_ref(), Positioned::Product, caller.store_id, &body.ids).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksBody {
  pub group_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Links {
  pub product_id: Uuid,
  pub group_ids:  Vec<Uuid>,
}

/// `PUT /products/{id}/complements`
pub async fn replace_links<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
  Json(body): Json<LinksBody>,
) -> Result<Json<Links>> {
  let group_ids =
    guard::replace_complement_links(repo.as_ref(), caller.store_id, id, &body.group_ids).await?;
  Ok(Json(Links { product_id: id, group_ids }))
}
