//! Error types for `storefront-core`.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Boxed gateway error carried by the persistence variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed input; always raised before any write.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// The id does not exist, or does not belong to the caller's store.
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  /// A destructive operation was blocked by existing order references, or a
  /// unique value is already held by another store.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("persistence failure: {0}")]
  Persistence(#[source] BoxError),

  #[error("order processing failed")]
  OrderProcessing(#[source] BoxError),
}

/// Machine-checkable error category surfaced at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  InvalidInput,
  NotFound,
  Conflict,
  PersistenceFailure,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::InvalidInput(_) => ErrorKind::InvalidInput,
      Self::NotFound { .. } => ErrorKind::NotFound,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Persistence(_) | Self::OrderProcessing(_) => {
        ErrorKind::PersistenceFailure
      }
    }
  }

  pub fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidInput(msg.into())
  }

  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    Self::NotFound { entity, id: id.to_string() }
  }

  /// Wrap a gateway error. Used as `.map_err(Error::persistence)`.
  pub fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Shorthand for the not-found error of a store-scoped lookup.
pub(crate) fn missing(entity: &'static str, id: Uuid) -> Error {
  Error::not_found(entity, id)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_cover_taxonomy() {
    assert_eq!(Error::invalid("x").kind(), ErrorKind::InvalidInput);
    assert_eq!(missing("product", Uuid::nil()).kind(), ErrorKind::NotFound);
    assert_eq!(Error::Conflict("x".into()).kind(), ErrorKind::Conflict);

    let io = std::io::Error::other("disk");
    assert_eq!(Error::persistence(io).kind(), ErrorKind::PersistenceFailure);
  }

  #[test]
  fn order_processing_hides_detail() {
    let err = Error::OrderProcessing(Box::new(std::io::Error::other("boom")));
    assert_eq!(err.to_string(), "order processing failed");
  }

  #[test]
  fn not_found_message_names_entity() {
    let err = Error::not_found("category", "abc");
    assert_eq!(err.to_string(), "category not found: abc");
  }
}
