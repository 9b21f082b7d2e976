//! Fixture schools for a fresh directory.

use crate::{
  field::{Field, Scalar},
  row::RawRow,
};

/// Two sample schools, as raw rows so they pass through the same pipeline as
/// any import.
pub fn seed_schools() -> Vec<RawRow> {
  vec![
    RawRow::new()
      .with(Field::SchoolNo, "SCH001")
      .with(Field::SchoolCensusNo, "CEN001")
      .with(Field::SchoolNameEn, "Central College")
      .with(Field::SchoolNameTa, "மத்திய கல்லூரி")
      .with(Field::SchoolNameSi, "මධ්‍ය විද්‍යාලය")
      .with(Field::SchoolType, "1AB")
      .with(Field::SchoolCategory, "national")
      .with(Field::Division, "Central Division")
      .with(Field::Zone, "Central Zone")
      .with(Field::District, "Colombo")
      .with(Field::Province, "Western")
      .with(Field::Address, "123 Main St, Colombo")
      .with(Field::Phone, "0111234567")
      .with(Field::Email, "info@centralcollege.lk")
      .with(Field::Website, "https://centralcollege.lk")
      .with(Field::EstablishedYear, 1950_i64)
      .with(Field::GeoLat, 6.927079)
      .with(Field::GeoLng, 79.861244)
      .with(Field::SchoolMapUrl, "https://maps.example.com/centralcollege"),
    RawRow::new()
      .with(Field::SchoolNo, "SCH002")
      .with(Field::SchoolCensusNo, "CEN002")
      .with(Field::SchoolNameEn, "Western High School")
      .with(Field::SchoolNameTa, Scalar::Null)
      .with(Field::SchoolNameSi, Scalar::Null)
      .with(Field::SchoolType, "1C")
      .with(Field::SchoolCategory, "province")
      .with(Field::Division, "Western Division")
      .with(Field::Zone, "Western Zone")
      .with(Field::District, "Gampaha")
      .with(Field::Province, "Western")
      .with(Field::Address, "456 High St, Gampaha")
      .with(Field::Phone, "0331234567")
      .with(Field::Email, "contact@westernhigh.lk")
      .with(Field::Website, "https://westernhigh.lk")
      .with(Field::EstablishedYear, 1975_i64)
      .with(Field::GeoLat, 7.0928)
      .with(Field::GeoLng, 80.0144)
      .with(Field::SchoolMapUrl, "https://maps.example.com/westernhigh"),
  ]
}
