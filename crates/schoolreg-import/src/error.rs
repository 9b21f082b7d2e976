//! Error type for `schoolreg-import`.

use schoolreg_core::field::Field;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Required columns that no header maps to.
  #[error("required columns are not mapped: {}", join(.0))]
  MissingColumns(Vec<Field>),

  #[error("row has {found} cells but only {expected} columns")]
  RowWidth { expected: usize, found: usize },

  #[error("import task failed: {0}")]
  Join(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn join(fields: &[Field]) -> String {
  fields.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(", ")
}
