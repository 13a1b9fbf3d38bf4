//! Caller identity, resolved by an upstream auth proxy.
//!
//! The proxy authenticates the request and forwards the result in two
//! headers: `x-user-id` (the account) and `x-store-id` (the tenant the
//! account is acting for). Both are UUIDs. Nothing here checks credentials.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";
pub const STORE_HEADER: &str = "x-store-id";

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, ApiError> {
  parts
    .headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| Uuid::parse_str(v.trim()).ok())
    .ok_or(ApiError::Unauthorized)
}

/// An authenticated account that may not own a store yet.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    header_uuid(parts, USER_HEADER).map(UserId)
  }
}

/// An account acting on one of its stores.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
  pub user_id:  Uuid,
  pub store_id: Uuid,
}

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    Ok(CallerIdentity {
      user_id:  header_uuid(parts, USER_HEADER)?,
      store_id: header_uuid(parts, STORE_HEADER)?,
    })
  }
}
