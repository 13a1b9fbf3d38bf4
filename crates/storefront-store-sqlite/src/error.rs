//! Error type for `storefront-store-sqlite`.

use storefront_core::repo::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  /// A stored value could not be decoded into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  /// A reference guard found `count` order items; the batch was rolled back.
  #[error("{count} order item(s) reference the products being deleted")]
  Referenced { count: u64 },

  /// A conditional update matched no row: the order left the status it was
  /// read in. The batch was rolled back.
  #[error("order {id} changed status since it was read")]
  Stale { id: uuid::Uuid },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    Error::Database(tokio_rusqlite::Error::Rusqlite(e))
  }
}

impl GatewayError for Error {
  fn is_unique_violation(&self) -> bool {
    let Error::Database(tokio_rusqlite::Error::Rusqlite(
      rusqlite::Error::SqliteFailure(e, _),
    )) = self
    else {
      return false;
    };
    matches!(
      e.extended_code,
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
  }

  fn is_referenced(&self) -> bool { matches!(self, Error::Referenced { .. }) }

  fn is_stale(&self) -> bool { matches!(self, Error::Stale { .. }) }
}
