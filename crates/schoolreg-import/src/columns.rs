//! The import column table and header-to-field guessing.

use serde::Serialize;
use schoolreg_core::{
  field::{Field, Scalar},
  row::RawRow,
};

use crate::{Error, Result};

/// One importable column as offered to the person mapping a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImportColumn {
  pub field:            Field,
  pub label:            &'static str,
  /// The import cannot start until some header maps to this column.
  pub required_mapping: bool,
  /// Lower-case header spellings that map to this column.
  pub guesses:          &'static [&'static str],
  pub example:          &'static str,
}

const fn column(
  field: Field,
  label: &'static str,
  required_mapping: bool,
  guesses: &'static [&'static str],
  example: &'static str,
) -> ImportColumn {
  ImportColumn { field, label, required_mapping, guesses, example }
}

pub const IMPORT_COLUMNS: &[ImportColumn] = &[
  column(Field::SchoolNo, "School No", true, &["school_no", "school no", "no"], "SCH001"),
  column(
    Field::SchoolCensusNo,
    "Census No",
    false,
    &["school_census_no", "census_no", "census no"],
    "CEN-2023-001",
  ),
  column(
    Field::SchoolNameEn,
    "Name (EN)",
    true,
    &["school_name_en", "name_en", "school name", "name"],
    "Central College",
  ),
  column(
    Field::SchoolNameTa,
    "Name (TA)",
    false,
    &["school_name_ta", "name_ta", "tamil name"],
    "மத்திய கல்லூரி",
  ),
  column(
    Field::SchoolNameSi,
    "Name (SI)",
    false,
    &["school_name_si", "name_si", "sinhala name"],
    "මධ්‍යම විද්‍යාලය",
  ),
  column(Field::SchoolType, "Type", true, &["school_type", "type"], "1AB"),
  column(
    Field::SchoolCategory,
    "Category",
    true,
    &["school_category", "category"],
    "national",
  ),
  column(Field::Division, "Division", false, &["division"], "Colombo"),
  column(Field::Zone, "Zone", false, &["zone"], "Zone 1"),
  column(Field::District, "District", false, &["district"], "Colombo"),
  column(Field::Province, "Province", false, &["province"], "Western"),
  column(Field::Address, "Address", false, &["address"], "123 Main Street, Colombo 07"),
  column(
    Field::Phone,
    "Phone",
    false,
    &["phone", "telephone", "contact", "tel"],
    "011-2345678",
  ),
  column(Field::Email, "Email", false, &["email", "e-mail", "mail"], "info@school.lk"),
  column(
    Field::Website,
    "Website",
    false,
    &["website", "url", "web", "site"],
    "https://www.school.lk",
  ),
  column(
    Field::EstablishedYear,
    "Established Year",
    false,
    &["established_year", "year", "established", "founded"],
    "1985",
  ),
  column(Field::GeoLat, "Latitude", false, &["geo_lat", "lat", "latitude"], "6.9271"),
  column(
    Field::GeoLng,
    "Longitude",
    false,
    &["geo_lng", "lng", "lon", "longitude"],
    "79.8612",
  ),
  column(
    Field::SchoolMapUrl,
    "Map URL",
    false,
    &["school_map_url", "map_url", "map", "google_maps"],
    "https://maps.google.com/?q=6.9271,79.8612",
  ),
];

impl ImportColumn {
  /// Whether `header` names this column: one of the guesses, or the label
  /// itself, compared case-insensitively after trimming.
  pub fn accepts(&self, header: &str) -> bool {
    let header = header.trim().to_lowercase();
    self.guesses.contains(&header.as_str()) || self.label.to_lowercase() == header
  }
}

/// The table entry for `field`.
pub fn import_column(field: Field) -> Option<&'static ImportColumn> {
  IMPORT_COLUMNS.iter().find(|c| c.field == field)
}

/// One example value per column, as a row that passes the whole pipeline.
pub fn example_row() -> RawRow {
  IMPORT_COLUMNS.iter().map(|c| (c.field, Scalar::from(c.example))).collect()
}

// ─── ColumnMap ───────────────────────────────────────────────────────────────

/// Which field each spreadsheet column feeds, by header position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
  slots: Vec<Option<Field>>,
}

impl ColumnMap {
  /// Guess a field for every header. A field is mapped at most once; the
  /// leftmost matching header wins. Unrecognised headers are ignored.
  pub fn guess<S: AsRef<str>>(headers: &[S]) -> Self {
    let mut slots: Vec<Option<Field>> = Vec::with_capacity(headers.len());
    for header in headers {
      let field = IMPORT_COLUMNS
        .iter()
        .find(|c| c.accepts(header.as_ref()) && !slots.contains(&Some(c.field)))
        .map(|c| c.field);
      slots.push(field);
    }
    Self { slots }
  }

  /// An explicit mapping, one entry per spreadsheet column.
  pub fn explicit(slots: Vec<Option<Field>>) -> Self { Self { slots } }

  pub fn width(&self) -> usize { self.slots.len() }

  pub fn field_at(&self, position: usize) -> Option<Field> {
    self.slots.get(position).copied().flatten()
  }

  pub fn mapped(&self) -> impl Iterator<Item = Field> + '_ {
    self.slots.iter().flatten().copied()
  }

  /// Required-mapping columns that no header maps to, in table order.
  pub fn missing_required(&self) -> Vec<Field> {
    IMPORT_COLUMNS
      .iter()
      .filter(|c| c.required_mapping && !self.slots.contains(&Some(c.field)))
      .map(|c| c.field)
      .collect()
  }

  pub fn ensure_complete(&self) -> Result<()> {
    let missing = self.missing_required();
    if missing.is_empty() { Ok(()) } else { Err(Error::MissingColumns(missing)) }
  }

  /// Build a raw row from one line of cells. Cells under unmapped headers are
  /// dropped. A short line leaves its trailing fields absent.
  pub fn row(&self, cells: Vec<Scalar>) -> Result<RawRow> {
    if cells.len() > self.slots.len() {
      return Err(Error::RowWidth { expected: self.slots.len(), found: cells.len() });
    }
    Ok(
      self
        .slots
        .iter()
        .zip(cells)
        .filter_map(|(slot, cell)| slot.map(|field| (field, cell)))
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use rstest::rstest;
  use schoolreg_core::{
    field::Field::*,
    normalize::normalize,
    validate::Validator,
  };

  use super::*;

  #[test]
  fn every_field_has_one_column() {
    assert_eq!(IMPORT_COLUMNS.len(), 19);
    for column in IMPORT_COLUMNS {
      assert_eq!(import_column(column.field), Some(column));
    }
    let required: Vec<_> = IMPORT_COLUMNS
      .iter()
      .filter(|c| c.required_mapping)
      .map(|c| c.field)
      .collect();
    assert_eq!(required, [SchoolNo, SchoolNameEn, SchoolType, SchoolCategory]);
  }

  #[rstest]
  #[case("School No", Some(SchoolNo))]
  #[case("  no ", Some(SchoolNo))]
  #[case("NAME", Some(SchoolNameEn))]
  #[case("Name (EN)", Some(SchoolNameEn))]
  #[case("Latitude", Some(GeoLat))]
  #[case("lon", Some(GeoLng))]
  #[case("E-Mail", Some(Email))]
  #[case("Map URL", Some(SchoolMapUrl))]
  #[case("founded", Some(EstablishedYear))]
  #[case("principal", None)]
  fn guesses_headers(#[case] header: &str, #[case] expected: Option<Field>) {
    assert_eq!(ColumnMap::guess(&[header]).field_at(0), expected);
  }

  #[test]
  fn a_field_is_mapped_once() {
    let map = ColumnMap::guess(&["name", "school name", "type"]);
    assert_eq!(map.field_at(0), Some(SchoolNameEn));
    assert_eq!(map.field_at(1), None);
    assert_eq!(map.field_at(2), Some(SchoolType));
  }

  #[test]
  fn reports_missing_required_mappings() {
    let map = ColumnMap::guess(&["School No", "Type", "Email"]);
    assert_eq!(map.missing_required(), [SchoolNameEn, SchoolCategory]);
    assert!(matches!(
      map.ensure_complete(),
      Err(Error::MissingColumns(ref f)) if f.len() == 2
    ));

    let map = ColumnMap::guess(&["no", "name", "type", "category"]);
    assert!(map.ensure_complete().is_ok());
  }

  #[test]
  fn builds_rows_from_cells() {
    let map = ColumnMap::guess(&["School No", "Notes", "Name", "Lat"]);
    let row = map
      .row(vec!["sch 1".into(), "ignored".into(), "hill school".into()])
      .unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(row.get(SchoolNo), Some(&Scalar::from("sch 1")));
    assert_eq!(row.get(GeoLat), None);

    let err = map.row(vec![Scalar::Null; 5]).unwrap_err();
    assert!(matches!(err, Error::RowWidth { expected: 4, found: 5 }));
  }

  #[test]
  fn example_row_passes_the_pipeline() {
    let valid = Validator::for_year(2026)
      .validate(&normalize(example_row()))
      .unwrap();
    assert_eq!(valid.school_no, "SCH001");
  }
}
