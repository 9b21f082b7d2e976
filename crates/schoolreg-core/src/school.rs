//! School records: the single persisted entity of the directory.
//!
//! A school is identified by a surrogate UUID, but imports reconcile on the
//! natural key `school_no`. Records are soft-deleted: `deleted_at` is set and
//! the row is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  field::{Field, Scalar},
  lifecycle::RecordStatus,
};

/// Identity of the user acting on a record; supplied by the surrounding
/// application, never derived from row data.
pub type ActorId = Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// School grade type. Membership is case-sensitive.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum SchoolType {
  #[serde(rename = "1AB")]
  #[strum(serialize = "1AB")]
  OneAb,
  #[serde(rename = "1C")]
  #[strum(serialize = "1C")]
  OneC,
  #[serde(rename = "type2")]
  #[strum(serialize = "type2")]
  Type2,
  #[serde(rename = "type3")]
  #[strum(serialize = "type3")]
  Type3,
}

impl SchoolType {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn label(self) -> &'static str {
    match self {
      Self::OneAb => "1AB",
      Self::OneC => "1C",
      Self::Type2 => "Type 2",
      Self::Type3 => "Type 3",
    }
  }
}

/// Administrative category of a school.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SchoolCategory {
  National,
  Province,
  Private,
  Semigovernment,
}

impl SchoolCategory {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn label(self) -> &'static str {
    match self {
      Self::National => "National",
      Self::Province => "Province",
      Self::Private => "Private",
      Self::Semigovernment => "Semi-Government",
    }
  }
}

// ─── School ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
  pub school_id:        Uuid,
  pub school_no:        String,
  pub school_census_no: Option<String>,
  pub school_name_en:   String,
  pub school_name_ta:   Option<String>,
  pub school_name_si:   Option<String>,
  pub school_type:      SchoolType,
  pub school_category:  SchoolCategory,
  pub division:         Option<String>,
  pub zone:             Option<String>,
  pub district:         Option<String>,
  pub province:         Option<String>,
  pub address:          Option<String>,
  pub phone:            Option<String>,
  pub email:            Option<String>,
  pub website:          Option<String>,
  pub established_year: Option<i32>,
  pub geo_lat:          Option<f64>,
  pub geo_lng:          Option<f64>,
  pub school_map_url:   Option<String>,
  pub created_by:       Option<ActorId>,
  pub updated_by:       Option<ActorId>,
  pub deleted_by:       Option<ActorId>,
  /// Store-assigned.
  pub created_at:       DateTime<Utc>,
  /// Store-assigned; bumped on every update.
  pub updated_at:       DateTime<Utc>,
  /// Soft-delete marker.
  pub deleted_at:       Option<DateTime<Utc>>,
}

impl School {
  pub fn is_trashed(&self) -> bool { self.deleted_at.is_some() }

  pub fn status(&self) -> RecordStatus {
    match self.deleted_at {
      Some(at) => RecordStatus::Trashed { at, by: self.deleted_by },
      None => RecordStatus::Active,
    }
  }

  /// The current value of one importable attribute.
  pub fn value(&self, field: Field) -> Scalar {
    let text = |v: &Option<String>| Scalar::from(v.clone());
    match field {
      Field::SchoolNo => self.school_no.as_str().into(),
      Field::SchoolCensusNo => text(&self.school_census_no),
      Field::SchoolNameEn => self.school_name_en.as_str().into(),
      Field::SchoolNameTa => text(&self.school_name_ta),
      Field::SchoolNameSi => text(&self.school_name_si),
      Field::SchoolType => self.school_type.as_str().into(),
      Field::SchoolCategory => self.school_category.as_str().into(),
      Field::Division => text(&self.division),
      Field::Zone => text(&self.zone),
      Field::District => text(&self.district),
      Field::Province => text(&self.province),
      Field::Address => text(&self.address),
      Field::Phone => text(&self.phone),
      Field::Email => text(&self.email),
      Field::Website => text(&self.website),
      Field::EstablishedYear => self.established_year.map(i64::from).into(),
      Field::GeoLat => self.geo_lat.into(),
      Field::GeoLng => self.geo_lng.into(),
      Field::SchoolMapUrl => text(&self.school_map_url),
    }
  }

  /// Overwrite every attribute the patch carries. Attributes the patch does
  /// not mention are left as they are.
  pub fn apply(&mut self, patch: SchoolPatch) {
    macro_rules! overwrite {
      ($target:ident, $patch:ident; $($field:ident),* $(,)?) => {
        $( if let Some(value) = $patch.$field { $target.$field = value; } )*
      };
    }
    overwrite!(
      self, patch;
      school_no,
      school_census_no,
      school_name_en,
      school_name_ta,
      school_name_si,
      school_type,
      school_category,
      division,
      zone,
      district,
      province,
      address,
      phone,
      email,
      website,
      established_year,
      geo_lat,
      geo_lng,
      school_map_url,
    );
  }
}

// ─── NewSchool ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::SchoolStore::create`]. The id and timestamps are
/// always set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchool {
  pub school_no:        String,
  pub school_census_no: Option<String>,
  pub school_name_en:   String,
  pub school_name_ta:   Option<String>,
  pub school_name_si:   Option<String>,
  pub school_type:      SchoolType,
  pub school_category:  SchoolCategory,
  pub division:         Option<String>,
  pub zone:             Option<String>,
  pub district:         Option<String>,
  pub province:         Option<String>,
  pub address:          Option<String>,
  pub phone:            Option<String>,
  pub email:            Option<String>,
  pub website:          Option<String>,
  pub established_year: Option<i32>,
  pub geo_lat:          Option<f64>,
  pub geo_lng:          Option<f64>,
  pub school_map_url:   Option<String>,
  pub created_by:       Option<ActorId>,
}

impl NewSchool {
  /// Convenience constructor with every optional attribute unset.
  pub fn new(
    school_no: impl Into<String>,
    school_name_en: impl Into<String>,
    school_type: SchoolType,
    school_category: SchoolCategory,
  ) -> Self {
    Self {
      school_no: school_no.into(),
      school_census_no: None,
      school_name_en: school_name_en.into(),
      school_name_ta: None,
      school_name_si: None,
      school_type,
      school_category,
      division: None,
      zone: None,
      district: None,
      province: None,
      address: None,
      phone: None,
      email: None,
      website: None,
      established_year: None,
      geo_lat: None,
      geo_lng: None,
      school_map_url: None,
      created_by: None,
    }
  }

  /// Build a new record keyed on `school_no` from a validated patch. Fields the
  /// patch leaves out take their default (unset).
  pub fn from_patch(school_no: String, patch: SchoolPatch) -> Result<Self> {
    let school_name_en = patch
      .school_name_en
      .ok_or(Error::MissingRequired(Field::SchoolNameEn))?;
    let school_type = patch
      .school_type
      .ok_or(Error::MissingRequired(Field::SchoolType))?;
    let school_category = patch
      .school_category
      .ok_or(Error::MissingRequired(Field::SchoolCategory))?;

    Ok(Self {
      school_no,
      school_census_no: patch.school_census_no.flatten(),
      school_name_en,
      school_name_ta: patch.school_name_ta.flatten(),
      school_name_si: patch.school_name_si.flatten(),
      school_type,
      school_category,
      division: patch.division.flatten(),
      zone: patch.zone.flatten(),
      district: patch.district.flatten(),
      province: patch.province.flatten(),
      address: patch.address.flatten(),
      phone: patch.phone.flatten(),
      email: patch.email.flatten(),
      website: patch.website.flatten(),
      established_year: patch.established_year.flatten(),
      geo_lat: patch.geo_lat.flatten(),
      geo_lng: patch.geo_lng.flatten(),
      school_map_url: patch.school_map_url.flatten(),
      created_by: None,
    })
  }
}

// ─── SchoolPatch ─────────────────────────────────────────────────────────────

/// A typed, validated set of attribute changes.
///
/// Outer `None` means the attribute was not supplied and must not be touched.
/// For nullable attributes, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchoolPatch {
  pub school_no:        Option<String>,
  pub school_census_no: Option<Option<String>>,
  pub school_name_en:   Option<String>,
  pub school_name_ta:   Option<Option<String>>,
  pub school_name_si:   Option<Option<String>>,
  pub school_type:      Option<SchoolType>,
  pub school_category:  Option<SchoolCategory>,
  pub division:         Option<Option<String>>,
  pub zone:             Option<Option<String>>,
  pub district:         Option<Option<String>>,
  pub province:         Option<Option<String>>,
  pub address:          Option<Option<String>>,
  pub phone:            Option<Option<String>>,
  pub email:            Option<Option<String>>,
  pub website:          Option<Option<String>>,
  pub established_year: Option<Option<i32>>,
  pub geo_lat:          Option<Option<f64>>,
  pub geo_lng:          Option<Option<f64>>,
  pub school_map_url:   Option<Option<String>>,
}
