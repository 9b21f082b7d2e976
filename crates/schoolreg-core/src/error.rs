//! Error types for `schoolreg-core`.

use thiserror::Error;

use crate::{field::Field, store::UniqueViolation, validate::ValidationErrors};

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing required field: {0}")]
  MissingRequired(Field),

  #[error(transparent)]
  Validation(#[from] ValidationErrors),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a single row could not be imported. No variant is fatal to a batch;
/// the row is counted as failed and the batch moves on.
#[derive(Debug, Error)]
pub enum RowError {
  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  #[error("{0}")]
  UniquenessConflict(UniqueViolation),

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RowError {
  /// Classify a store failure: uniqueness conflicts are reported as such,
  /// everything else is a persistence error.
  pub fn from_store<E: crate::store::StoreError>(err: E) -> Self {
    match err.unique_violation() {
      Some(violation) => Self::UniquenessConflict(violation),
      None => Self::Persistence(Box::new(err)),
    }
  }
}

impl From<Error> for RowError {
  fn from(err: Error) -> Self {
    match err {
      Error::MissingRequired(field) => {
        Self::Validation(ValidationErrors::single(
          field,
          crate::validate::Violation::Required,
        ))
      }
      Error::Validation(errors) => Self::Validation(errors),
    }
  }
}
