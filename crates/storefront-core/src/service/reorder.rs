//! Transactional reordering of categories and products.

use std::collections::HashSet;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
  Error, Result,
  repo::{Positioned, Repository, Write},
};

/// Assign `order = index` to each id, as one batch.
///
/// Every statement is filtered by `store_id`, so ids of other stores are
/// silently left out of the write. Positions are indexes into `ordered_ids`;
/// a repeated id keeps its first index and later ids are not shifted.
#[instrument(skip(repo, ordered_ids), fields(?kind, %store_id, n = ordered_ids.len()))]
pub async fn reorder<R: Repository>(
  repo: &R,
  kind: Positioned,
  store_id: Uuid,
  ordered_ids: &[Uuid],
) -> Result<()> {
  if ordered_ids.is_empty() {
    return Err(Error::invalid("nothing to reorder"));
  }

  let mut seen = HashSet::with_capacity(ordered_ids.len());
  let batch = ordered_ids
    .iter()
    .copied()
    .enumerate()
    .filter(|(_, id)| seen.insert(*id))
    .map(|(position, id)| Write::SetPosition {
      kind,
      store_id,
      id,
      position: position as i64,
    })
    .collect();

  repo.transaction(batch).await.map_err(Error::persistence)?;
  debug!("reordered");
  Ok(())
}
