//! Soft-delete lifecycle.
//!
//! Deleting a school sets its `deleted_at` marker and keeps the row; restoring
//! clears the marker. Only a force delete removes the row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::school::{ActorId, School};

// ─── Computed status ─────────────────────────────────────────────────────────

/// The lifecycle status of a school, derived from its soft-delete marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordStatus {
  Active,
  Trashed {
    at: DateTime<Utc>,
    by: Option<ActorId>,
  },
}

impl RecordStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

/// Which records a listing includes with respect to the soft-delete marker.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TrashedFilter {
  /// Live records only.
  #[default]
  Without,
  /// Live and trashed records.
  With,
  /// Trashed records only.
  Only,
}

impl TrashedFilter {
  pub fn admits(self, school: &School) -> bool {
    match self {
      Self::Without => !school.is_trashed(),
      Self::With => true,
      Self::Only => school.is_trashed(),
    }
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A school bundled with its computed status, as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct SchoolView {
  #[serde(flatten)]
  pub school: School,
  pub status: RecordStatus,
}

impl From<School> for SchoolView {
  fn from(school: School) -> Self {
    let status = school.status();
    Self { school, status }
  }
}
