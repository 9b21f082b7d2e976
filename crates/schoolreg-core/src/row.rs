//! Row maps: the raw row handed over by an import source and the canonical row
//! produced by [`crate::normalize`].
//!
//! A field missing from the map means "not supplied"; [`Scalar::Null`] means
//! "explicitly null". The distinction drives partial-update semantics.

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::field::{Field, Scalar};

// ─── RawRow ──────────────────────────────────────────────────────────────────

/// One record as read from a spreadsheet, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<Field, Scalar>);

impl RawRow {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert.
  pub fn with(mut self, field: Field, value: impl Into<Scalar>) -> Self {
    self.0.insert(field, value.into());
    self
  }

  /// Build a row from column names that are already field names. Names that
  /// do not name a field are ignored, the way unmapped columns are.
  pub fn from_named<K, V, I>(pairs: I) -> Self
  where
    K: AsRef<str>,
    V: Into<Scalar>,
    I: IntoIterator<Item = (K, V)>,
  {
    pairs
      .into_iter()
      .filter_map(|(k, v)| {
        Field::from_str(k.as_ref().trim()).ok().map(|f| (f, v.into()))
      })
      .collect()
  }

  pub fn insert(&mut self, field: Field, value: impl Into<Scalar>) {
    self.0.insert(field, value.into());
  }

  pub fn get(&self, field: Field) -> Option<&Scalar> { self.0.get(&field) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn into_inner(self) -> BTreeMap<Field, Scalar> { self.0 }
}

impl FromIterator<(Field, Scalar)> for RawRow {
  fn from_iter<I: IntoIterator<Item = (Field, Scalar)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── NormalizedRow ───────────────────────────────────────────────────────────

/// A row after canonicalization, ready for the validator. Only
/// [`crate::normalize::normalize`] constructs one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRow(pub(crate) BTreeMap<Field, Scalar>);

impl NormalizedRow {
  pub fn get(&self, field: Field) -> Option<&Scalar> { self.0.get(&field) }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &Scalar)> {
    self.0.iter().map(|(f, v)| (*f, v))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// The normalized natural key, if the row carries a textual one.
  pub fn school_no(&self) -> Option<&str> {
    self.get(Field::SchoolNo).and_then(Scalar::as_text)
  }
}
