//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so they sort
//! lexically. Enums are stored as their canonical strings. UUIDs are stored as
//! hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use schoolreg_core::school::{School, SchoolCategory, SchoolType};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_school_type(s: &str) -> Result<SchoolType> {
  SchoolType::from_str(s).map_err(|_| Error::UnknownValue {
    column: "school_type",
    value:  s.to_owned(),
  })
}

pub fn decode_school_category(s: &str) -> Result<SchoolCategory> {
  SchoolCategory::from_str(s).map_err(|_| Error::UnknownValue {
    column: "school_category",
    value:  s.to_owned(),
  })
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that reads whole schools; the order
/// matches [`RawSchool::from_row`].
pub const SCHOOL_COLUMNS: &str = "school_id, school_no, school_census_no, \
  school_name_en, school_name_ta, school_name_si, school_type, \
  school_category, division, zone, district, province, address, phone, email, \
  website, established_year, geo_lat, geo_lng, school_map_url, created_by, \
  updated_by, deleted_by, created_at, updated_at, deleted_at";

/// Raw values read directly from a `schools` row.
pub struct RawSchool {
  pub school_id:        String,
  pub school_no:        String,
  pub school_census_no: Option<String>,
  pub school_name_en:   String,
  pub school_name_ta:   Option<String>,
  pub school_name_si:   Option<String>,
  pub school_type:      String,
  pub school_category:  String,
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
  pub created_by:       Option<String>,
  pub updated_by:       Option<String>,
  pub deleted_by:       Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
  pub deleted_at:       Option<String>,
}

impl RawSchool {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      school_id:        row.get(0)?,
      school_no:        row.get(1)?,
      school_census_no: row.get(2)?,
      school_name_en:   row.get(3)?,
      school_name_ta:   row.get(4)?,
      school_name_si:   row.get(5)?,
      school_type:      row.get(6)?,
      school_category:  row.get(7)?,
      division:         row.get(8)?,
      zone:             row.get(9)?,
      district:         row.get(10)?,
      province:         row.get(11)?,
      address:          row.get(12)?,
      phone:            row.get(13)?,
      email:            row.get(14)?,
      website:          row.get(15)?,
      established_year: row.get(16)?,
      geo_lat:          row.get(17)?,
      geo_lng:          row.get(18)?,
      school_map_url:   row.get(19)?,
      created_by:       row.get(20)?,
      updated_by:       row.get(21)?,
      deleted_by:       row.get(22)?,
      created_at:       row.get(23)?,
      updated_at:       row.get(24)?,
      deleted_at:       row.get(25)?,
    })
  }

  pub fn into_school(self) -> Result<School> {
    let actor = |s: Option<String>| s.as_deref().map(decode_uuid).transpose();

    Ok(School {
      school_id:        decode_uuid(&self.school_id)?,
      school_no:        self.school_no,
      school_census_no: self.school_census_no,
      school_name_en:   self.school_name_en,
      school_name_ta:   self.school_name_ta,
      school_name_si:   self.school_name_si,
      school_type:      decode_school_type(&self.school_type)?,
      school_category:  decode_school_category(&self.school_category)?,
      division:         self.division,
      zone:             self.zone,
      district:         self.district,
      province:         self.province,
      address:          self.address,
      phone:            self.phone,
      email:            self.email,
      website:          self.website,
      established_year: self.established_year,
      geo_lat:          self.geo_lat,
      geo_lng:          self.geo_lng,
      school_map_url:   self.school_map_url,
      created_by:       actor(self.created_by)?,
      updated_by:       actor(self.updated_by)?,
      deleted_by:       actor(self.deleted_by)?,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
      deleted_at:       self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
