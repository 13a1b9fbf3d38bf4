//! Consistency operations layered on the [`Repository`] gateway.
//!
//! Each function takes the gateway by reference plus explicit tenant and
//! entity ids, and keeps no state between calls. Multi-statement mutations are
//! submitted as a single [`Repository::transaction`] batch.
//!
//! [`Repository`]: crate::repo::Repository
//! [`Repository::transaction`]: crate::repo::Repository::transaction

pub mod catalog;
pub mod cloner;
pub mod complements;
pub mod guard;
pub mod orders;
pub mod reorder;
pub mod settings;
pub mod stores;

use uuid::Uuid;

use crate::{
  Error, Result,
  error::missing,
  repo::Repository,
  tenant::Store,
};

/// Resolve a store or fail with `NotFound`.
pub(crate) async fn require_store<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<Store> {
  repo
    .get_store(store_id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("store", store_id))
}

pub(crate) async fn require_store_by_subdomain<R: Repository>(
  repo: &R,
  subdomain: &str,
) -> Result<Store> {
  repo
    .get_store_by_subdomain(subdomain.to_owned())
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| Error::not_found("store", subdomain))
}

/// Reject blank names; return the trimmed value.
pub(crate) fn required_name(field: &str, value: &str) -> Result<String> {
  let v = value.trim();
  if v.is_empty() {
    return Err(Error::invalid(format!("{field} is required")));
  }
  Ok(v.to_owned())
}
