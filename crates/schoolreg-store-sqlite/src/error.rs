//! Error type for `schoolreg-store-sqlite`.

use schoolreg_core::store::{StoreError, UniqueViolation};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column holds a value outside the closed set.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  #[error("{0}")]
  UniqueViolation(UniqueViolation),

  #[error("school not found: {0}")]
  NotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn unique_violation(&self) -> Option<UniqueViolation> {
    match self {
      Self::UniqueViolation(v) => Some(v.clone()),
      _ => None,
    }
  }

  fn is_not_found(&self) -> bool { matches!(self, Self::NotFound(_)) }
}
