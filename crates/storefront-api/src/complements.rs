//! Handlers for complement groups and their options.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/complement-groups` | Groups with options |
//! | `POST`   | `/complement-groups` | Group plus initial `options` |
//! | `PATCH`  | `/complement-groups/{id}` | `options`, when present, is the full desired list |
//! | `DELETE` | `/complement-groups/{id}` | Removes links and options too |
//! | `DELETE` | `/complement-items/{id}` | One option only |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use storefront_core::{
  catalog::{ComplementGroupPatch, GroupWithItems, NewComplementGroup},
  repo::Repository,
  service::{complements, guard},
};
use uuid::Uuid;

use crate::{error::Result, identity::CallerIdentity};

/// `GET /complement-groups`
pub async fn list<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
) -> Result<Json<Vec<GroupWithItems>>> {
  Ok(Json(complements::list_complement_groups(repo.as_ref(), caller.store_id).await?))
}

/// `POST /complement-groups`
pub async fn create<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Json(body): Json<NewComplementGroup>,
) -> Result<impl IntoResponse> {
  let group = complements::create_complement_group(repo.as_ref(), caller.store_id, body).await?;
  Ok((StatusCode::CREATED, Json(group)))
}

/// `PATCH /complement-groups/{id}`
pub async fn update<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
  Json(patch): Json<ComplementGroupPatch>,
) -> Result<Json<GroupWithItems>> {
  let group =
    complements::update_complement_group(repo.as_ref(), caller.store_id, id, patch).await?;
  Ok(Json(group))
}

/// `DELETE /complement-groups/{id}`
pub async fn delete_group<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode> {
  guard::delete_complement_group(repo.as_ref(), caller.store_id, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /complement-items/{id}`
pub async fn delete_item<R: Repository>(
  State(repo): State<Arc<R>>,
  caller: CallerIdentity,
  Path(id): Path<Uuid>,
) -> Result<StatusCode> {
  guard::delete_complement_item(repo.as_ref(), caller.store_id, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
