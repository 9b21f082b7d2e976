//! Row normalizer: raw spreadsheet values → canonical values.
//!
//! Pure and synchronous. Rules run in a fixed order because later rules read
//! values earlier rules already trimmed:
//!
//!   trim → school_no → school_type → school_category → email → website
//!     → empty-to-null → numeric coercion → title case

use std::collections::BTreeMap;

use crate::{
  field::{Field, Scalar},
  row::{NormalizedRow, RawRow},
};

// ─── Synonym tables ──────────────────────────────────────────────────────────

/// Lower-cased spellings of a school type → canonical value.
pub const SCHOOL_TYPE_SYNONYMS: &[(&str, &str)] = &[
  ("1ab", "1AB"),
  ("1 ab", "1AB"),
  ("1-ab", "1AB"),
  ("1c", "1C"),
  ("1 c", "1C"),
  ("1-c", "1C"),
  ("type 2", "type2"),
  ("type-2", "type2"),
  ("type 3", "type3"),
  ("type-3", "type3"),
];

/// Lower-cased spellings of a school category → canonical value.
pub const SCHOOL_CATEGORY_SYNONYMS: &[(&str, &str)] = &[
  ("semi-government", "semigovernment"),
  ("semi government", "semigovernment"),
  ("provincial", "province"),
];

const TITLE_CASED: [Field; 4] = [
  Field::SchoolNameEn,
  Field::Province,
  Field::District,
  Field::Division,
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
  table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

// ─── Single-value rules ──────────────────────────────────────────────────────

/// Uppercase and drop every whitespace character. Idempotent.
pub fn normalize_school_no(s: &str) -> String {
  s.chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_uppercase)
    .collect()
}

/// Resolve a school type synonym; unknown spellings come back unchanged.
pub fn normalize_school_type(s: &str) -> String {
  lookup(SCHOOL_TYPE_SYNONYMS, &s.to_lowercase())
    .map_or_else(|| s.to_owned(), str::to_owned)
}

/// Resolve a school category synonym; unknown spellings come back
/// lower-cased.
pub fn normalize_school_category(s: &str) -> String {
  let lower = s.to_lowercase();
  lookup(SCHOOL_CATEGORY_SYNONYMS, &lower)
    .map_or(lower, str::to_owned)
}

/// Prefix `https://` unless an http(s) scheme is already there (any case).
pub fn normalize_website(s: &str) -> String {
  let has_scheme = |scheme: &str| {
    s.get(..scheme.len())
      .is_some_and(|p| p.eq_ignore_ascii_case(scheme))
  };
  if has_scheme("http://") || has_scheme("https://") {
    s.to_owned()
  } else {
    format!("https://{s}")
  }
}

/// Capitalize the first letter of each word and lower-case the rest.
pub fn title_case(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut in_word = false;
  for c in s.chars() {
    if c.is_alphanumeric() || c == '\'' {
      if in_word {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      in_word = true;
    } else {
      out.push(c);
      in_word = false;
    }
  }
  out
}

// ─── Row normalizer ──────────────────────────────────────────────────────────

/// Rewrite a non-empty text value in place.
fn map_text(
  fields: &mut BTreeMap<Field, Scalar>,
  field: Field,
  rule: impl FnOnce(&str) -> String,
) {
  if let Some(Scalar::Text(s)) = fields.get_mut(&field)
    && !s.is_empty()
  {
    *s = rule(s);
  }
}

/// Replace a text value with a typed one when `parse` accepts it.
fn coerce(
  fields: &mut BTreeMap<Field, Scalar>,
  field: Field,
  parse: impl FnOnce(&str) -> Option<Scalar>,
) {
  if let Some(value) = fields.get_mut(&field)
    && let Scalar::Text(s) = &*value
    && let Some(parsed) = parse(s)
  {
    *value = parsed;
  }
}

fn parse_float(s: &str) -> Option<Scalar> {
  s.parse::<f64>()
    .ok()
    .filter(|x| x.is_finite())
    .map(Scalar::Float)
}

/// Integers, and decimal text with no fractional part (`"1975.0"`).
fn parse_year(s: &str) -> Option<Scalar> {
  if let Ok(n) = s.parse::<i64>() {
    return Some(Scalar::Int(n));
  }
  s.parse::<f64>()
    .ok()
    .filter(|x| x.is_finite() && x.fract() == 0.0)
    .filter(|x| x.abs() < i64::MAX as f64)
    .map(|x| Scalar::Int(x as i64))
}

/// Canonicalize one raw row. Fields absent from the input stay absent.
pub fn normalize(raw: RawRow) -> NormalizedRow {
  let mut fields = raw.into_inner();

  for value in fields.values_mut() {
    if let Scalar::Text(s) = value {
      let trimmed = s.trim();
      if trimmed.len() != s.len() {
        *s = trimmed.to_owned();
      }
    }
  }

  map_text(&mut fields, Field::SchoolNo, normalize_school_no);
  map_text(&mut fields, Field::SchoolType, normalize_school_type);
  map_text(&mut fields, Field::SchoolCategory, normalize_school_category);
  map_text(&mut fields, Field::Email, str::to_lowercase);
  map_text(&mut fields, Field::Website, normalize_website);
  // Phone is trimmed only; its format is preserved.

  for (field, value) in fields.iter_mut() {
    if field.is_nullable() && value.as_text() == Some("") {
      *value = Scalar::Null;
    }
  }

  coerce(&mut fields, Field::EstablishedYear, parse_year);
  coerce(&mut fields, Field::GeoLat, parse_float);
  coerce(&mut fields, Field::GeoLng, parse_float);

  for field in TITLE_CASED {
    map_text(&mut fields, field, title_case);
  }

  NormalizedRow(fields)
}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use super::*;

  fn one(field: Field, value: impl Into<Scalar>) -> NormalizedRow {
    normalize(RawRow::new().with(field, value))
  }

  #[rstest]
  #[case("sch 001", "SCH001")]
  #[case(" sch-001 ", "SCH-001")]
  #[case("sch\t0 0 1\n", "SCH001")]
  #[case("SCH001", "SCH001")]
  fn school_no_is_uppercased_without_whitespace(
    #[case] input: &str,
    #[case] expected: &str,
  ) {
    let row = one(Field::SchoolNo, input);
    assert_eq!(row.school_no(), Some(expected));
  }

  #[test]
  fn school_no_normalization_is_idempotent() {
    for input in ["sch 001", " a b-c ", "ßchool 9", "SCH001", "  "] {
      let once = normalize_school_no(input);
      assert_eq!(normalize_school_no(&once), once);
    }
  }

  #[rstest]
  #[case("1ab", "1AB")]
  #[case("1 AB", "1AB")]
  #[case("1-ab", "1AB")]
  #[case("1AB", "1AB")]
  #[case("1 c", "1C")]
  #[case("type-2", "type2")]
  #[case("Type 3", "type3")]
  #[case("type2", "type2")]
  #[case("TYPE2", "TYPE2")]
  #[case("foo", "foo")]
  #[case("Foo Bar", "Foo Bar")]
  fn school_type_synonyms(#[case] input: &str, #[case] expected: &str) {
    let row = one(Field::SchoolType, input);
    assert_eq!(row.get(Field::SchoolType), Some(&Scalar::from(expected)));
  }

  #[rstest]
  #[case("Semi-Government", "semigovernment")]
  #[case("semi government", "semigovernment")]
  #[case("Provincial", "province")]
  #[case("NATIONAL", "national")]
  #[case("Unknown", "unknown")]
  fn school_category_synonyms(#[case] input: &str, #[case] expected: &str) {
    let row = one(Field::SchoolCategory, input);
    assert_eq!(row.get(Field::SchoolCategory), Some(&Scalar::from(expected)));
  }

  #[rstest]
  #[case("www.school.lk", "https://www.school.lk")]
  #[case("http://x.lk", "http://x.lk")]
  #[case("HTTPS://X.lk", "HTTPS://X.lk")]
  #[case(" school.lk/about ", "https://school.lk/about")]
  fn website_gets_a_scheme(#[case] input: &str, #[case] expected: &str) {
    let row = one(Field::Website, input);
    assert_eq!(row.get(Field::Website), Some(&Scalar::from(expected)));
  }

  #[test]
  fn email_is_lowercased_and_phone_only_trimmed() {
    let row = normalize(
      RawRow::new()
        .with(Field::Email, " Info@School.LK ")
        .with(Field::Phone, " 011-234 5678 "),
    );
    assert_eq!(row.get(Field::Email), Some(&Scalar::from("info@school.lk")));
    assert_eq!(row.get(Field::Phone), Some(&Scalar::from("011-234 5678")));
  }

  #[test]
  fn empty_nullable_fields_become_null_and_are_not_coerced() {
    let row = normalize(
      RawRow::new()
        .with(Field::GeoLat, "")
        .with(Field::EstablishedYear, "   ")
        .with(Field::Website, "")
        .with(Field::SchoolNameEn, ""),
    );
    assert_eq!(row.get(Field::GeoLat), Some(&Scalar::Null));
    assert_eq!(row.get(Field::EstablishedYear), Some(&Scalar::Null));
    assert_eq!(row.get(Field::Website), Some(&Scalar::Null));
    // Required fields keep their empty string for the validator to reject.
    assert_eq!(row.get(Field::SchoolNameEn), Some(&Scalar::from("")));
  }

  #[test]
  fn numeric_strings_are_coerced() {
    let row = normalize(
      RawRow::new()
        .with(Field::EstablishedYear, "1975")
        .with(Field::GeoLat, " 7.0928 ")
        .with(Field::GeoLng, "-80")
        .with(Field::Zone, "42"),
    );
    assert_eq!(row.get(Field::EstablishedYear), Some(&Scalar::Int(1975)));
    assert_eq!(row.get(Field::GeoLat), Some(&Scalar::Float(7.0928)));
    assert_eq!(row.get(Field::GeoLng), Some(&Scalar::Float(-80.0)));
    assert_eq!(row.get(Field::Zone), Some(&Scalar::from("42")));
  }

  #[rstest]
  #[case(Field::EstablishedYear, "1975.0", Scalar::Int(1975))]
  #[case(Field::EstablishedYear, " 2001.000 ", Scalar::Int(2001))]
  #[case(Field::EstablishedYear, "1975.5", Scalar::from("1975.5"))]
  #[case(Field::GeoLat, "7", Scalar::Float(7.0))]
  #[case(Field::GeoLng, "79.8612", Scalar::Float(79.8612))]
  fn decimal_text_is_coerced(
    #[case] field: Field,
    #[case] input: &str,
    #[case] expected: Scalar,
  ) {
    assert_eq!(one(field, input).get(field), Some(&expected));
  }

  #[rstest]
  #[case(Scalar::from("1975.0"), Scalar::Float(1975.0))]
  #[case(Scalar::from("1975"), Scalar::Int(1975))]
  #[case(Scalar::from("1975.5"), Scalar::Float(1975.5))]
  fn typed_and_text_years_validate_alike(
    #[case] text: Scalar,
    #[case] typed: Scalar,
  ) {
    let validator = crate::validate::Validator::for_year(2026);
    let row = |year: Scalar| {
      RawRow::new()
        .with(Field::SchoolNo, "SCH001")
        .with(Field::SchoolNameEn, "Central College")
        .with(Field::SchoolType, "1AB")
        .with(Field::SchoolCategory, "national")
        .with(Field::EstablishedYear, year)
    };
    let text = validator.validate(&normalize(row(text)));
    let typed = validator.validate(&normalize(row(typed)));
    assert_eq!(text.is_ok(), typed.is_ok());
    if let (Ok(text), Ok(typed)) = (text, typed) {
      assert_eq!(text.patch.established_year, typed.patch.established_year);
    }
  }

  #[test]
  fn unparseable_numbers_are_left_as_text() {
    let row = normalize(
      RawRow::new()
        .with(Field::EstablishedYear, "nineteen")
        .with(Field::GeoLat, "inf"),
    );
    assert_eq!(
      row.get(Field::EstablishedYear),
      Some(&Scalar::from("nineteen"))
    );
    assert_eq!(row.get(Field::GeoLat), Some(&Scalar::from("inf")));
  }

  #[test]
  fn typed_values_pass_through() {
    let row = normalize(
      RawRow::new()
        .with(Field::GeoLat, 6.5)
        .with(Field::EstablishedYear, 1950_i64)
        .with(Field::SchoolNo, 42_i64),
    );
    assert_eq!(row.get(Field::GeoLat), Some(&Scalar::Float(6.5)));
    assert_eq!(row.get(Field::EstablishedYear), Some(&Scalar::Int(1950)));
    assert_eq!(row.get(Field::SchoolNo), Some(&Scalar::Int(42)));
  }

  #[rstest]
  #[case("western high school", "Western High School")]
  #[case("ST. JOHN'S COLLEGE", "St. John's College")]
  #[case("nuwara-eliya", "Nuwara-Eliya")]
  #[case("1st lane", "1st Lane")]
  fn title_case_words(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(title_case(input), expected);
  }

  #[test]
  fn title_case_applies_to_names_and_regions_only() {
    let row = normalize(
      RawRow::new()
        .with(Field::Province, "western")
        .with(Field::District, "GAMPAHA")
        .with(Field::Division, "central division")
        .with(Field::Zone, "zone one")
        .with(Field::Address, "12 main street"),
    );
    assert_eq!(row.get(Field::Province), Some(&Scalar::from("Western")));
    assert_eq!(row.get(Field::District), Some(&Scalar::from("Gampaha")));
    assert_eq!(
      row.get(Field::Division),
      Some(&Scalar::from("Central Division"))
    );
    assert_eq!(row.get(Field::Zone), Some(&Scalar::from("zone one")));
    assert_eq!(row.get(Field::Address), Some(&Scalar::from("12 main street")));
  }

  #[test]
  fn absent_fields_stay_absent() {
    let row = one(Field::SchoolNo, "sch1");
    assert_eq!(row.len(), 1);
    assert!(!row.contains(Field::GeoLat));
  }

  #[test]
  fn end_to_end_row() {
    let row = normalize(
      RawRow::new()
        .with(Field::SchoolNo, " sch002 ")
        .with(Field::SchoolNameEn, "western high school")
        .with(Field::SchoolType, "1 c")
        .with(Field::SchoolCategory, "provincial")
        .with(Field::GeoLat, "7.0928")
        .with(Field::EstablishedYear, "1975"),
    );
    let expected: Vec<(Field, Scalar)> = vec![
      (Field::SchoolNo, "SCH002".into()),
      (Field::SchoolNameEn, "Western High School".into()),
      (Field::SchoolType, "1C".into()),
      (Field::SchoolCategory, "province".into()),
      (Field::EstablishedYear, Scalar::Int(1975)),
      (Field::GeoLat, Scalar::Float(7.0928)),
    ];
    let mut actual: Vec<(Field, Scalar)> =
      row.iter().map(|(f, v)| (f, v.clone())).collect();
    actual.sort_by_key(|(f, _)| *f);
    let mut expected = expected;
    expected.sort_by_key(|(f, _)| *f);
    assert_eq!(actual, expected);
  }
}
