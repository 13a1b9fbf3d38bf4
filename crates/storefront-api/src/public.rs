//! Unauthenticated storefront routes, addressed by subdomain.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/public/{subdomain}/menu` | Active catalog plus settings |
//! | `GET`  | `/public/{subdomain}/settings` | Opening hours, fees |
//! | `POST` | `/public/{subdomain}/orders` | Customer checkout |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;
use storefront_core::{
  order::NewOrder,
  repo::Repository,
  service::{orders, settings, stores},
  tenant::{PublicStore, StoreSettings},
};
use tracing::info;

use crate::error::Result;

/// `GET /public/{subdomain}/menu`
pub async fn menu<R: Repository>(
  State(repo): State<Arc<R>>,
  Path(subdomain): Path<String>,
) -> Result<Json<stores::Menu>> {
  Ok(Json(stores::public_menu(repo.as_ref(), &subdomain).await?))
}

#[derive(Debug, Serialize)]
pub struct PublicSettings {
  pub store:    PublicStore,
  pub settings: StoreSettings,
}

/// `GET /public/{subdomain}/settings`
pub async fn store_settings<R: Repository>(
  State(repo): State<Arc<R>>,
  Path(subdomain): Path<String>,
) -> Result<Json<PublicSettings>> {
  let (store, settings) = settings::settings_for_subdomain(repo.as_ref(), &subdomain).await?;
  Ok(Json(PublicSettings { store, settings }))
}

/// `POST /public/{subdomain}/orders`
pub async fn place_order<R: Repository>(
  State(repo): State<Arc<R>>,
  Path(subdomain): Path<String>,
  Json(body): Json<NewOrder>,
) -> Result<impl IntoResponse> {
  let store = stores::public_store(repo.as_ref(), &subdomain).await?;
  let view = orders::create_order(repo.as_ref(), store.id, body).await?;
  info!(%subdomain, order_id = %view.id, "order placed from storefront");
  Ok((StatusCode::CREATED, Json(view)))
}
