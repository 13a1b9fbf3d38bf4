//! Handlers for the store's orders.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/orders` | Newest first |
//! | `POST`  | `/orders` | Order taken by the store itself |
//! | `GET`   | `/orders/{id}` | |
//! | `PATCH` | `/orders/{id}/status` | Body: `{"status":"preparing"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use storefront_core::{
  order::{NewOrder, OrderView},
  repo::Repository,
  service::orders,
};
use uuid::Uuid;

use crate::{error::Result, identity::CallerIdentity};

/// `GET /orders`
pub async fn list<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
) -> Result<Json<Vec<OrderView>>> {
  Ok(Json(orders::list_orders(repo.as_ref(), caller.store_id).await?))
}

/// `POST /orders`
pub async fn create<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<NewOrder>,
) -> Result<impl IntoResponse> {
  let view = orders::create_order(repo.as_ref(), caller.store_id, body).await?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /orders/{id}`
pub async fn get_one<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<Json<OrderView>> {
  Ok(Json(orders::get_order(repo.as_ref(), caller.store_id, id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
  pub status:      String,
  #[serde(default)]
  pub reason:      Option<String>,
  #[serde(default)]
  pub canceled_by: Option<String>,
}

/// `PATCH /orders/{id}/status`
pub async fn update_status<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<OrderView>> {
  let view = orders::set_status(
    repo.as_ref(),
    caller.store_id,
    id,
    &body.status,
    body.reason.as_deref(),
    body.canceled_by.as_deref(),
  )
  .await?;
  Ok(Json(view))
}
