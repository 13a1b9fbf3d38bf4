//! Complement groups and their options.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
  Error, Result,
  catalog::{
    ComplementGroup, ComplementGroupPatch, ComplementItem, GroupChanges,
    GroupWithItems, NewComplementGroup, OptionInput, check_selection_bounds,
  },
  error::missing,
  image,
  repo::{Repository, Write},
  service::{require_store, required_name},
};

/// Create a group and its initial options in one transaction.
#[instrument(skip(repo, input), fields(%store_id))]
pub async fn create_complement_group<R: Repository>(
  repo: &R,
  store_id: Uuid,
  input: NewComplementGroup,
) -> Result<GroupWithItems> {
  let name = required_name("name", &input.name)?;
  let (min, max) = (input.min.unwrap_or(0), input.max.unwrap_or(1));
  check_selection_bounds(min, max)?;
  require_store(repo, store_id).await?;

  let group = ComplementGroup {
    id: Uuid::new_v4(),
    store_id,
    name,
    description: input.description.unwrap_or_default(),
    required: input.required.unwrap_or(false),
    min,
    max,
    kind: input.kind.unwrap_or_default(),
    active: true,
    created_at: Utc::now(),
  };
  let items: Vec<ComplementItem> = input
    .options
    .iter()
    .map(|o| option_row(group.id, Uuid::new_v4(), o))
    .collect::<Result<_>>()?;

  let mut batch = Vec::with_capacity(items.len() + 1);
  batch.push(Write::InsertComplementGroup(group.clone()));
  batch.extend(items.iter().cloned().map(Write::InsertComplementItem));
  repo.transaction(batch).await.map_err(Error::persistence)?;

  info!(group_id = %group.id, options = items.len(), "created complement group");
  Ok(GroupWithItems { group, items })
}

/// Every group of a store with its options.
#[instrument(skip(repo), fields(%store_id))]
pub async fn list_complement_groups<R: Repository>(
  repo: &R,
  store_id: Uuid,
) -> Result<Vec<GroupWithItems>> {
  let groups = repo
    .list_complement_groups(store_id)
    .await
    .map_err(Error::persistence)?;
  let items = repo
    .list_complement_items(groups.iter().map(|g| g.id).collect())
    .await
    .map_err(Error::persistence)?;

  Ok(
    groups
      .into_iter()
      .map(|group| GroupWithItems {
        items: items.iter().filter(|i| i.group_id == group.id).cloned().collect(),
        group,
      })
      .collect(),
  )
}

/// Patch a group. When `options` is present it is the desired option list:
/// options whose id is already in the group are updated, others created, and
/// options not listed deleted. Everything commits together.
#[instrument(skip(repo, patch), fields(%store_id, %id))]
pub async fn update_complement_group<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
  patch: ComplementGroupPatch,
) -> Result<GroupWithItems> {
  let current = require_group(repo, store_id, id).await?;
  check_selection_bounds(
    patch.min.unwrap_or(current.min),
    patch.max.unwrap_or(current.max),
  )?;

  let mut changes = GroupChanges::from(&patch);
  if let Some(name) = &changes.name {
    changes.name = Some(required_name("name", name)?);
  }

  let mut batch = Vec::new();
  if changes != GroupChanges::default() {
    batch.push(Write::UpdateComplementGroup { store_id, id, changes });
  }

  if let Some(options) = &patch.options {
    let existing = repo
      .list_complement_items(vec![id])
      .await
      .map_err(Error::persistence)?;

    let mut keep = Vec::with_capacity(options.len());
    for opt in options {
      let known = opt
        .id
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .and_then(|oid| existing.iter().find(|e| e.id == oid));

      match known {
        Some(prev) => {
          let mut row = option_row(id, prev.id, opt)?;
          row.created_at = prev.created_at;
          keep.push(row.id);
          batch.push(Write::UpdateComplementItem(row));
        }
        None => {
          let row = option_row(id, Uuid::new_v4(), opt)?;
          keep.push(row.id);
          batch.push(Write::InsertComplementItem(row));
        }
      }
    }
    batch.push(Write::DeleteComplementItems { group_id: id, keep });
  }

  if !batch.is_empty() {
    repo.transaction(batch).await.map_err(Error::persistence)?;
  }
  debug!("updated complement group");

  let group = require_group(repo, store_id, id).await?;
  let items = repo
    .list_complement_items(vec![id])
    .await
    .map_err(Error::persistence)?;
  Ok(GroupWithItems { group, items })
}

async fn require_group<R: Repository>(
  repo: &R,
  store_id: Uuid,
  id: Uuid,
) -> Result<ComplementGroup> {
  repo
    .get_complement_group(store_id, id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| missing("complement group", id))
}

fn option_row(group_id: Uuid, id: Uuid, o: &OptionInput) -> Result<ComplementItem> {
  let price = o.price.unwrap_or(Decimal::ZERO);
  if price.is_sign_negative() {
    return Err(Error::invalid("option price must not be negative"));
  }
  Ok(ComplementItem {
    id,
    group_id,
    name: required_name("option name", &o.name)?,
    price,
    active: o.active.unwrap_or(true),
    image_url: image::normalize_opt(o.image_url.as_deref()),
    description: o.description.clone().unwrap_or_default(),
    created_at: Utc::now(),
  })
}
