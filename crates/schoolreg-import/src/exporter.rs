//! Rendering schools as spreadsheet rows.

use serde::Serialize;
use tracing::info;

use schoolreg_core::{
  field::Field,
  school::School,
  tally::{BatchKind, BatchSummary, BatchTally},
};

/// Where an export column takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportValue {
  Field(Field),
  CreatedAt,
  UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportColumn {
  pub value: ExportValue,
  pub label: &'static str,
}

const fn field(field: Field, label: &'static str) -> ExportColumn {
  ExportColumn { value: ExportValue::Field(field), label }
}

pub const EXPORT_COLUMNS: &[ExportColumn] = &[
  field(Field::SchoolNo, "School No"),
  field(Field::SchoolCensusNo, "Census No"),
  field(Field::SchoolNameEn, "Name (EN)"),
  field(Field::SchoolNameTa, "Name (TA)"),
  field(Field::SchoolNameSi, "Name (SI)"),
  field(Field::SchoolType, "Type"),
  field(Field::SchoolCategory, "Category"),
  field(Field::Division, "Division"),
  field(Field::Zone, "Zone"),
  field(Field::District, "District"),
  field(Field::Province, "Province"),
  field(Field::Address, "Address"),
  field(Field::Phone, "Phone"),
  field(Field::Email, "Email"),
  field(Field::Website, "Website"),
  field(Field::EstablishedYear, "Established Year"),
  field(Field::GeoLat, "Latitude"),
  field(Field::GeoLng, "Longitude"),
  field(Field::SchoolMapUrl, "Map URL"),
  ExportColumn { value: ExportValue::CreatedAt, label: "Created At" },
  ExportColumn { value: ExportValue::UpdatedAt, label: "Updated At" },
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl ExportColumn {
  /// The cell for `school`; null renders as the empty string.
  pub fn render(&self, school: &School) -> String {
    match self.value {
      ExportValue::Field(field) => school.value(field).render().unwrap_or_default(),
      ExportValue::CreatedAt => school.created_at.format(TIMESTAMP_FORMAT).to_string(),
      ExportValue::UpdatedAt => school.updated_at.format(TIMESTAMP_FORMAT).to_string(),
    }
  }
}

/// A finished export: one header line and one line per school.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Export {
  pub headers: Vec<&'static str>,
  pub rows:    Vec<Vec<String>>,
  pub summary: BatchSummary,
}

pub fn export(records: &[School]) -> Export {
  let tally = BatchTally::new();
  let rows: Vec<Vec<String>> = records
    .iter()
    .map(|school| {
      let line: Vec<String> = EXPORT_COLUMNS.iter().map(|c| c.render(school)).collect();
      tally.record_success();
      line
    })
    .collect();

  let summary = tally.summary(BatchKind::Export);
  info!(rows = summary.successful, "{summary}");
  Export {
    headers: EXPORT_COLUMNS.iter().map(|c| c.label).collect(),
    rows,
    summary,
  }
}
