//! Running rows through the pipeline, one at a time and in chunked batches.

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use schoolreg_core::{
  RowError,
  field::Field,
  normalize::{normalize, normalize_school_no},
  reconcile::{Reconciled, reconcile},
  row::RawRow,
  school::ActorId,
  store::SchoolStore,
  tally::{BatchKind, BatchSummary, BatchTally},
  validate::Validator,
};

use crate::Result;

pub const DEFAULT_CHUNK_SIZE: usize = 100;

// ─── Importer ────────────────────────────────────────────────────────────────

/// Normalizes, validates and reconciles single rows against a store.
pub struct Importer<S> {
  store:     S,
  validator: Validator,
  actor:     Option<ActorId>,
}

impl<S: SchoolStore> Importer<S> {
  pub fn new(store: S) -> Self {
    Self { store, validator: Validator::current(), actor: None }
  }

  pub fn with_validator(mut self, validator: Validator) -> Self {
    self.validator = validator;
    self
  }

  /// Record `actor` as the creator or last editor of every row imported.
  pub fn with_actor(mut self, actor: Option<ActorId>) -> Self {
    self.actor = actor;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  /// Take one raw row all the way to a persisted record.
  pub async fn import_row(&self, raw: RawRow) -> Result<Reconciled, RowError> {
    let row = normalize(raw);
    debug!(school_no = row.school_no().unwrap_or_default(), fields = row.len(), "row normalized");
    let valid = self.validator.validate(&row)?;
    reconcile(&self.store, valid, self.actor).await
  }
}

// ─── Batch runner ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
  /// Rows per chunk.
  pub chunk_size:  usize,
  /// Chunks processed at once. Rows within a chunk always run in order.
  pub concurrency: usize,
}

impl Default for ImportOptions {
  fn default() -> Self { Self { chunk_size: DEFAULT_CHUNK_SIZE, concurrency: 1 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
  Validation,
  UniquenessConflict,
  Persistence,
}

/// A row that was counted as failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowFailure {
  /// 1-based position of the row in the batch.
  pub row:       usize,
  pub school_no: Option<String>,
  pub kind:      FailureKind,
  pub message:   String,
  /// Validation messages per field; empty for other kinds.
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub fields:    BTreeMap<Field, Vec<String>>,
}

impl RowFailure {
  fn new(row: usize, school_no: Option<String>, err: &RowError) -> Self {
    let (kind, fields) = match err {
      RowError::Validation(errors) => (FailureKind::Validation, errors.messages()),
      RowError::UniquenessConflict(_) => (FailureKind::UniquenessConflict, BTreeMap::new()),
      RowError::Persistence(_) => (FailureKind::Persistence, BTreeMap::new()),
    };
    Self { row, school_no, kind, message: err.to_string(), fields }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
  pub summary:  BatchSummary,
  /// Sorted by row.
  pub failures: Vec<RowFailure>,
}

/// Import `rows` in chunks. A failed row is logged, counted and skipped; rows
/// persisted before it stay persisted.
pub async fn run_import<S>(
  importer: Arc<Importer<S>>,
  rows: Vec<RawRow>,
  options: ImportOptions,
) -> Result<ImportReport>
where
  S: SchoolStore + 'static,
{
  let chunk_size = options.chunk_size.max(1);
  let concurrency = options.concurrency.max(1);
  let tally = Arc::new(BatchTally::new());
  info!(rows = rows.len(), chunk_size, concurrency, "import started");

  let mut chunks: Vec<Vec<(usize, RawRow)>> = Vec::new();
  for (index, raw) in rows.into_iter().enumerate() {
    if index % chunk_size == 0 {
      chunks.push(Vec::with_capacity(chunk_size));
    }
    if let Some(chunk) = chunks.last_mut() {
      chunk.push((index + 1, raw));
    }
  }

  let mut tasks = JoinSet::new();
  let mut failures = Vec::new();

  for chunk in chunks {
    if tasks.len() >= concurrency
      && let Some(done) = tasks.join_next().await
    {
      failures.extend(done?);
    }
    tasks.spawn(import_chunk(Arc::clone(&importer), Arc::clone(&tally), chunk));
  }
  while let Some(done) = tasks.join_next().await {
    failures.extend(done?);
  }

  failures.sort_by_key(|f: &RowFailure| f.row);
  let summary = tally.summary(BatchKind::Import);
  info!(successful = summary.successful, failed = summary.failed, "{summary}");
  Ok(ImportReport { summary, failures })
}

async fn import_chunk<S: SchoolStore>(
  importer: Arc<Importer<S>>,
  tally: Arc<BatchTally>,
  chunk: Vec<(usize, RawRow)>,
) -> Vec<RowFailure> {
  let mut failures = Vec::new();
  for (row, raw) in chunk {
    let school_no = raw
      .get(Field::SchoolNo)
      .and_then(|v| v.render())
      .map(|s| normalize_school_no(s.trim()))
      .filter(|s| !s.is_empty());

    match importer.import_row(raw).await {
      Ok(outcome) => {
        debug!(row, school_no = %outcome.school().school_no, created = outcome.is_created(), "row imported");
        tally.record_success();
      }
      Err(err) => {
        warn!(row, school_no = school_no.as_deref().unwrap_or_default(), error = %err, "row failed to import");
        tally.record_failure();
        failures.push(RowFailure::new(row, school_no, &err));
      }
    }
  }
  failures
}
