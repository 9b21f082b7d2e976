//! The `SchoolStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `schoolreg-store-sqlite`). The reconciler and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  field::Field,
  lifecycle::TrashedFilter,
  school::{ActorId, NewSchool, School, SchoolCategory, SchoolType},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A write rejected because a unique column already holds the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueViolation {
  pub field: Field,
  pub value: String,
}

impl fmt::Display for UniqueViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} '{}' is already taken", self.field, self.value)
  }
}

/// What the reconciler and the HTTP layer need to know about a backend error.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `Some` when the failure was a unique-constraint conflict.
  fn unique_violation(&self) -> Option<UniqueViolation>;

  /// `true` when the addressed record does not exist.
  fn is_not_found(&self) -> bool;
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Columns a listing may be ordered by.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
  SchoolNo,
  #[default]
  SchoolNameEn,
  Province,
  GeoLat,
  GeoLng,
  CreatedAt,
  UpdatedAt,
}

impl SortKey {
  pub fn column(self) -> &'static str {
    match self {
      Self::SchoolNo => "school_no",
      Self::SchoolNameEn => "school_name_en",
      Self::Province => "province",
      Self::GeoLat => "geo_lat",
      Self::GeoLng => "geo_lng",
      Self::CreatedAt => "created_at",
      Self::UpdatedAt => "updated_at",
    }
  }
}

/// Parameters for [`SchoolStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolQuery {
  /// Case-insensitive substring over the identifying, location and contact
  /// columns.
  pub search:          Option<String>,
  pub school_type:     Option<SchoolType>,
  pub school_category: Option<SchoolCategory>,
  pub province:        Option<String>,
  pub has_email:       Option<bool>,
  pub has_website:     Option<bool>,
  pub trashed:         TrashedFilter,
  pub sort:            SortKey,
  pub descending:      bool,
  pub limit:           Option<usize>,
  pub offset:          Option<usize>,
}

impl SchoolQuery {
  /// Whether `school` passes every filter. Ordering and paging are not
  /// considered.
  pub fn matches(&self, school: &School) -> bool {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

    if !self.trashed.admits(school) {
      return false;
    }
    if let Some(t) = self.school_type
      && school.school_type != t
    {
      return false;
    }
    if let Some(c) = self.school_category
      && school.school_category != c
    {
      return false;
    }
    if let Some(p) = &self.province
      && school.province.as_deref() != Some(p.as_str())
    {
      return false;
    }
    if let Some(want) = self.has_email
      && present(&school.email) != want
    {
      return false;
    }
    if let Some(want) = self.has_website
      && present(&school.website) != want
    {
      return false;
    }
    if let Some(needle) = self.search.as_deref().filter(|s| !s.is_empty()) {
      let needle = needle.to_lowercase();
      let hit = [
        Some(school.school_no.as_str()),
        school.school_census_no.as_deref(),
        Some(school.school_name_en.as_str()),
        school.division.as_deref(),
        school.zone.as_deref(),
        school.district.as_deref(),
        school.province.as_deref(),
        school.phone.as_deref(),
        school.email.as_deref(),
        school.website.as_deref(),
      ]
      .into_iter()
      .flatten()
      .any(|s| s.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }
    true
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a school directory backend.
///
/// `school_no` and `school_census_no` are unique across every stored record,
/// trashed ones included; a conflicting write fails with an error whose
/// [`StoreError::unique_violation`] is `Some`.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: StoreError;

  /// Find the live record with the given natural key. Trashed records are
  /// never returned.
  fn find_by_key<'a>(
    &'a self,
    school_no: &'a str,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + 'a;

  /// Retrieve a record by id, trashed or not.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<School>, Self::Error>> + Send + '_;

  /// Persist a new record. The id and both timestamps are set by the store,
  /// and `updated_by` starts out equal to `created_by`.
  fn create(
    &self,
    input: NewSchool,
  ) -> impl Future<Output = Result<School, Self::Error>> + Send + '_;

  /// Write every attribute of `school` back to its row and bump
  /// `updated_at`.
  fn update(
    &self,
    school: School,
  ) -> impl Future<Output = Result<School, Self::Error>> + Send + '_;

  /// Set the soft-delete marker. Already-trashed records keep their original
  /// marker.
  fn soft_delete(
    &self,
    id: Uuid,
    actor: Option<ActorId>,
  ) -> impl Future<Output = Result<School, Self::Error>> + Send + '_;

  /// Clear the soft-delete marker. Restoring a live record is a no-op.
  fn restore(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<School, Self::Error>> + Send + '_;

  /// Remove the row permanently.
  fn force_delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List records matching `query`.
  fn list<'a>(
    &'a self,
    query: &'a SchoolQuery,
  ) -> impl Future<Output = Result<Vec<School>, Self::Error>> + Send + 'a;

  /// Every distinct non-empty province among live records, sorted.
  fn distinct_provinces(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
