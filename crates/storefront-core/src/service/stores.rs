//! Store profile operations and the public menu.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::CategoryDetail,
  image,
  repo::{GatewayError, Repository, Write},
  service::{
    catalog::categories_with_products,
    require_store, require_store_by_subdomain, required_name,
    settings::provision,
  },
  tenant::{
    PublicStore, Store, StoreProfilePatch, StoreSettings, non_empty,
    subdomain_from_name, validate_subdomain,
  },
};

/// What a customer sees when opening a store's menu.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
  pub store:      PublicStore,
  pub settings:   StoreSettings,
  /// Active categories with their active products, in display order.
  pub categories: Vec<CategoryDetail>,
}

/// Create a store for `user_id` with a subdomain derived from `name`, and
/// its default settings, in one transaction.
#[instrument(skip(repo), fields(%user_id))]
pub async fn create_store<R: Repository>(
  repo: &R,
  user_id: Uuid,
  name: &str,
) -> Result<(Store, StoreSettings)> {
  let name = required_name("name", name)?;
  let store = Store {
    id: Uuid::new_v4(),
    user_id,
    subdomain: subdomain_from_name(&name),
    name,
    description: None,
    logo_url: None,
    cover_image: None,
    address: None,
    created_at: Utc::now(),
  };
  let settings = StoreSettings::defaults(store.id);

  repo
    .transaction(vec![
      Write::InsertStore(store.clone()),
      Write::InsertSettings(settings.clone()),
    ])
    .await
    .map_err(|e| taken(&store.subdomain, e))?;

  info!(store_id = %store.id, subdomain = %store.subdomain, "created store");
  Ok((store, settings))
}

/// The store owned by `user_id`.
#[instrument(skip(repo), fields(%user_id))]
pub async fn store_for_user<R: Repository>(repo: &R, user_id: Uuid) -> Result<Store> {
  repo
    .get_store_by_user(user_id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| Error::not_found("store for user", user_id))
}

/// Patch display fields. Names and descriptions are trimmed; image URLs that
/// are not absolute web URLs are ignored.
#[instrument(skip(repo, patch), fields(%store_id))]
pub async fn update_store_profile<R: Repository>(
  repo: &R,
  store_id: Uuid,
  patch: StoreProfilePatch,
) -> Result<Store> {
  require_store(repo, store_id).await?;

  let patch = StoreProfilePatch {
    name:        patch
      .name
      .as_deref()
      .map(|n| required_name("name", n))
      .transpose()?,
    description: patch.description.map(|d| d.trim().to_owned()),
    logo_url:    image::normalize_opt(patch.logo_url.as_deref()),
    cover_image: image::normalize_opt(patch.cover_image.as_deref()),
    address:     patch.address.as_deref().and_then(non_empty),
  };
  repo
    .apply(Write::UpdateStoreProfile { store_id, patch })
    .await
    .map_err(Error::persistence)?;
  require_store(repo, store_id).await
}

/// Move a store to a new subdomain. Fails with `Conflict` when another store
/// holds it.
#[instrument(skip(repo), fields(%store_id))]
pub async fn update_subdomain<R: Repository>(
  repo: &R,
  store_id: Uuid,
  subdomain: &str,
) -> Result<Store> {
  let subdomain = subdomain.trim().to_ascii_lowercase();
  validate_subdomain(&subdomain)?;
  require_store(repo, store_id).await?;

  let holder = repo
    .get_store_by_subdomain(subdomain.clone())
    .await
    .map_err(Error::persistence)?;
  if holder.is_some_and(|s| s.id != store_id) {
    return Err(Error::Conflict(format!("subdomain {subdomain:?} is already in use")));
  }

  repo
    .apply(Write::SetSubdomain { store_id, subdomain: subdomain.clone() })
    .await
    .map_err(|e| taken(&subdomain, e))?;
  info!(%subdomain, "changed subdomain");
  require_store(repo, store_id).await
}

/// The public profile behind `subdomain`.
#[instrument(skip(repo))]
pub async fn public_store<R: Repository>(repo: &R, subdomain: &str) -> Result<PublicStore> {
  let store = require_store_by_subdomain(repo, subdomain).await?;
  Ok(PublicStore::from(&store))
}

/// Public menu for `subdomain`; provisions settings on first read.
#[instrument(skip(repo))]
pub async fn public_menu<R: Repository>(repo: &R, subdomain: &str) -> Result<Menu> {
  let store = require_store_by_subdomain(repo, subdomain).await?;
  let settings = provision(repo, store.id).await?;
  let categories = categories_with_products(repo, store.id, true).await?;
  Ok(Menu { store: PublicStore::from(&store), settings, categories })
}

fn taken<E: GatewayError>(subdomain: &str, e: E) -> Error {
  if e.is_unique_violation() {
    Error::Conflict(format!("subdomain {subdomain:?} is already in use"))
  } else {
    Error::persistence(e)
  }
}
