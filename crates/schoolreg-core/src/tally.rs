//! Success and failure accounting for import and export batches.

use std::{
  fmt,
  sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
  Import,
  Export,
}

impl BatchKind {
  fn noun(self) -> &'static str {
    match self {
      Self::Import => "import",
      Self::Export => "export",
    }
  }

  fn past_tense(self) -> &'static str {
    match self {
      Self::Import => "imported",
      Self::Export => "exported",
    }
  }
}

/// Counters shared by every chunk of a running batch.
#[derive(Debug, Default)]
pub struct BatchTally {
  successful: AtomicU64,
  failed:     AtomicU64,
}

impl BatchTally {
  pub fn new() -> Self { Self::default() }

  pub fn record_success(&self) { self.successful.fetch_add(1, Ordering::Relaxed); }

  pub fn record_failure(&self) { self.failed.fetch_add(1, Ordering::Relaxed); }

  pub fn successful(&self) -> u64 { self.successful.load(Ordering::Relaxed) }

  pub fn failed(&self) -> u64 { self.failed.load(Ordering::Relaxed) }

  pub fn summary(&self, kind: BatchKind) -> BatchSummary {
    BatchSummary { kind, successful: self.successful(), failed: self.failed() }
  }
}

/// Final counts of a batch. `Display` renders the completion notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
  pub kind:       BatchKind,
  pub successful: u64,
  pub failed:     u64,
}

impl fmt::Display for BatchSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Your school {} has completed and {} {} {}.",
      self.kind.noun(),
      format_count(self.successful),
      rows(self.successful),
      self.kind.past_tense(),
    )?;
    if self.failed > 0 {
      write!(
        f,
        " {} {} failed to {}.",
        format_count(self.failed),
        rows(self.failed),
        self.kind.noun(),
      )?;
    }
    Ok(())
  }
}

fn rows(n: u64) -> &'static str {
  if n == 1 { "row" } else { "rows" }
}

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}
