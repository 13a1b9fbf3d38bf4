//! Handlers for the caller's store profile and settings.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/stores` | Body: `{"name":"..."}`; needs only `x-user-id` |
//! | `GET`   | `/stores/me` | The caller's store |
//! | `PATCH` | `/store` | Profile patch |
//! | `PUT`   | `/store/subdomain` | Body: `{"subdomain":"..."}`; 409 if taken |
//! | `GET`   | `/settings` | Created with defaults on first read |
//! | `PUT`   | `/settings` | Partial update |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use storefront_core::{
  repo::Repository,
  service::{settings, stores},
  tenant::{SettingsPatch, Store, StoreProfilePatch, StoreSettings},
};

use crate::{
  error::Result,
  identity::{CallerIdentity, UserId},
};

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Created {
  pub store:    Store,
  pub settings: StoreSettings,
}

/// `POST /stores`
pub async fn create<R: Repository>(
  State(repo): State<Arc<R>>,
  UserId(user_id): UserId,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse> {
  let (store, settings) = stores::create_store(repo.as_ref(), user_id, &body.name).await?;
  Ok((StatusCode::CREATED, Json(Created { store, settings })))
}

/// `GET /stores/me`
pub async fn mine<R: Repository>(
  State(repo): State<Arc<R>>,
  UserId(user_id): UserId,
) -> Result<Json<Store>> {
  Ok(Json(stores::store_for_user(repo.as_ref(), user_id).await?))
}

/// `PATCH /store`
pub async fn update_profile<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(patch): Json<StoreProfilePatch>,
) -> Result<Json<Store>> {
  let store = stores::update_store_profile(repo.as_ref(), caller.store_id, patch).await?;
  Ok(Json(store))
}

#[derive(Debug, Deserialize)]
pub struct SubdomainBody {
  pub subdomain: String,
}

/// `PUT /store/subdomain`
pub async fn update_subdomain<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<SubdomainBody>,
) -> Result<Json<Store>> {
  let store = stores::update_subdomain(repo.as_ref(), caller.store_id, &body.subdomain).await?;
  Ok(Json(store))
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// `GET /settings`
pub async fn get_settings<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
) -> Result<Json<StoreSettings>> {
  let s = settings::get_or_create_settings(repo.as_ref(), caller.store_id).await?;
  Ok(Json(s))
}

/// `PUT /settings`
pub async fn update_settings<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(patch): Json<SettingsPatch>,
) -> Result<Json<StoreSettings>> {
  let s = settings::update_settings(repo.as_ref(), caller.store_id, patch).await?;
  Ok(Json(s))
}
