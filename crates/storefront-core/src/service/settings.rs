//! Settings provisioner: the one-to-one settings row, created on first read.

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  repo::{GatewayError, Repository, Write},
  service::{require_store, require_store_by_subdomain},
  tenant::{PublicStore, SettingsPatch, StoreSettings},
};

/// Return the store's settings, creating the default row if there is none.
///
/// Safe under concurrent first reads: the settings row is unique per store,
/// and losing the insert race re-fetches the winner's row.
#[instrument(skip(repo), fields(%store_id))]
pub async fn get_or_create_settings<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<StoreSettings> {
  require_store(repo, store_id).await?;
  provision(repo, store_id).await
}

/// Resolve a store by subdomain, then get-or-create its settings.
#[instrument(skip(repo))]
pub async fn settings_for_subdomain<R: Repository>(
  repo: &R,
  subdomain: &str,
) -> Result<(PublicStore, StoreSettings)> {
  let store = require_store_by_subdomain(repo, subdomain).await?;
  let settings = provision(repo, store.id).await?;
  Ok((PublicStore::from(&store), settings))
}

pub(crate) async fn provision<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<StoreSettings> {
  if let Some(existing) = find(repo, store_id).await? {
    return Ok(existing);
  }

  let fresh = StoreSettings::defaults(store_id);
  match repo.apply(Write::InsertSettings(fresh.clone())).await {
    Ok(()) => {
      info!(settings_id = %fresh.id, "provisioned default settings");
      Ok(fresh)
    }
    Err(e) if e.is_unique_violation() => {
      warn!("settings created concurrently; re-fetching");
      find(repo, store_id)
        .await?
        .ok_or_else(|| Error::persistence(e))
    }
    Err(e) => Err(Error::persistence(e)),
  }
}

/// Upsert: merge `patch` into the existing row, or create defaults plus
/// overrides when the store has none yet.
#[instrument(skip(repo, patch), fields(%store_id))]
pub async fn update_settings<R: Repository>(
  repo: &R,
  store_id: Uuid,
  patch: SettingsPatch,
) -> Result<StoreSettings> {
  patch.validate()?;
  require_store(repo, store_id).await?;

  if find(repo, store_id).await?.is_none() {
    let created = StoreSettings::defaults(store_id).merged(&patch);
    match repo.apply(Write::InsertSettings(created.clone())).await {
      Ok(()) => {
        debug!(settings_id = %created.id, "created settings from update");
        return Ok(created);
      }
      // Someone provisioned the row in between; fall through to update it.
      Err(e) if e.is_unique_violation() => {}
      Err(e) => return Err(Error::persistence(e)),
    }
  }

  let current = find(repo, store_id)
    .await?
    .ok_or_else(|| Error::not_found("settings", store_id))?;
  let mut updated = current.merged(&patch);
  updated.updated_at = chrono::Utc::now();

  repo
    .apply(Write::UpdateSettings(updated.clone()))
    .await
    .map_err(Error::persistence)?;
  debug!(settings_id = %updated.id, "updated settings");
  Ok(updated)
}

async fn find<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<Option<StoreSettings>> {
  repo.find_settings(store_id).await.map_err(Error::persistence)
}
