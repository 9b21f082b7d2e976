//! Importable fields and the scalar cell values a spreadsheet row carries.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

// ─── Field ───────────────────────────────────────────────────────────────────

/// Every attribute of a school that a row may supply. The snake_case name is
/// both the serde tag and the database column name.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
  SchoolNo,
  SchoolCensusNo,
  SchoolNameEn,
  SchoolNameTa,
  SchoolNameSi,
  SchoolType,
  SchoolCategory,
  Division,
  Zone,
  District,
  Province,
  Address,
  Phone,
  Email,
  Website,
  EstablishedYear,
  GeoLat,
  GeoLng,
  SchoolMapUrl,
}

impl Field {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Fields whose empty-string value is rewritten to an explicit null.
  pub fn is_nullable(self) -> bool {
    !matches!(
      self,
      Self::SchoolNo
        | Self::SchoolNameEn
        | Self::SchoolType
        | Self::SchoolCategory
    )
  }

  /// The field name as it reads in a sentence, e.g. `"school name en"`.
  pub fn human_name(self) -> String { self.as_str().replace('_', " ") }
}

impl std::fmt::Display for Field {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Scalar ──────────────────────────────────────────────────────────────────

/// One cell of a row. Spreadsheet readers mostly hand over text, but numeric
/// cells may already arrive typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Null,
  Int(i64),
  Float(f64),
  Text(String),
}

impl Scalar {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  /// `true` for null and for the empty string.
  pub fn is_blank(&self) -> bool {
    match self {
      Self::Null => true,
      Self::Text(s) => s.is_empty(),
      _ => false,
    }
  }

  /// String form of the value; `None` for null.
  pub fn render(&self) -> Option<String> {
    match self {
      Self::Null => None,
      Self::Int(n) => Some(n.to_string()),
      Self::Float(x) => Some(x.to_string()),
      Self::Text(s) => Some(s.clone()),
    }
  }
}

impl From<&str> for Scalar {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for Scalar {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<i64> for Scalar {
  fn from(n: i64) -> Self { Self::Int(n) }
}

impl From<f64> for Scalar {
  fn from(x: f64) -> Self { Self::Float(x) }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}
