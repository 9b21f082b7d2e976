//! Field rule table applied to a normalized row.
//!
//! Validation never short-circuits: every field is checked and every violation
//! is collected, so a rejected row reports its complete set of problems.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::LazyLock};

use chrono::{Datelike, Utc};
use regex::Regex;

use crate::{
  field::{Field, Scalar},
  row::NormalizedRow,
  school::{SchoolCategory, SchoolPatch, SchoolType},
};

pub const MAX_STRING_LEN: usize = 255;
pub const MIN_ESTABLISHED_YEAR: i64 = 1800;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?(?:\.[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?)*$",
  )
  .expect("email pattern compiles")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)^[a-z][a-z0-9+.-]*://(?:[^\s:@/]+(?::[^\s@/]*)?@)?(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?(?:\.[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?)*|\[[0-9a-f:.]+\])(?::[0-9]{1,5})?(?:[/?#]\S*)?$",
  )
  .expect("url pattern compiles")
});

pub fn is_valid_email(s: &str) -> bool { EMAIL.is_match(s) }

pub fn is_valid_url(s: &str) -> bool { URL.is_match(s) }

// ─── Violations ──────────────────────────────────────────────────────────────

/// One broken rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
  #[error("is required")]
  Required,
  #[error("must not be greater than {max} characters")]
  TooLong { max: usize },
  #[error("must be one of: {allowed}")]
  NotAllowed { allowed: &'static str },
  #[error("must be a valid email address")]
  InvalidEmail,
  #[error("must be a valid URL")]
  InvalidUrl,
  #[error("must be an integer")]
  NotInteger,
  #[error("must be a number")]
  NotNumeric,
  #[error("must be between {min} and {max}")]
  OutOfRange { min: f64, max: f64 },
}

/// Every violation found in a row, grouped by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<Field, Vec<Violation>>);

impl ValidationErrors {
  pub fn single(field: Field, violation: Violation) -> Self {
    let mut errors = Self::default();
    errors.add(field, violation);
    errors
  }

  pub fn add(&mut self, field: Field, violation: Violation) {
    self.0.entry(field).or_default().push(violation);
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: Field) -> &[Violation] {
    self.0.get(&field).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
    self.0.keys().copied()
  }

  /// Sentences such as `"The school no field is required."`, per field.
  pub fn messages(&self) -> BTreeMap<Field, Vec<String>> {
    self
      .0
      .iter()
      .map(|(field, violations)| {
        let name = field.human_name();
        let lines = violations
          .iter()
          .map(|v| format!("The {name} field {v}."))
          .collect();
        (*field, lines)
      })
      .collect()
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("validation failed")?;
    let mut sep = ": ";
    for (field, violations) in &self.0 {
      for v in violations {
        write!(f, "{sep}{field} {v}")?;
        sep = "; ";
      }
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Validator ───────────────────────────────────────────────────────────────

/// A row that passed every rule, split into its natural key and the typed
/// attribute changes it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow {
  pub school_no: String,
  pub patch:     SchoolPatch,
}

/// Applies the rule table. The upper bound of `established_year` is the
/// calendar year the validator was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
  current_year: i32,
}

impl Default for Validator {
  fn default() -> Self { Self::current() }
}

const SCHOOL_TYPES: &str = "1AB, 1C, type2, type3";
const SCHOOL_CATEGORIES: &str = "national, province, private, semigovernment";

impl Validator {
  pub fn for_year(current_year: i32) -> Self { Self { current_year } }

  pub fn current() -> Self { Self::for_year(Utc::now().year()) }

  pub fn current_year(&self) -> i32 { self.current_year }

  /// Validate a full row: required fields must be present and non-empty.
  pub fn validate(
    &self,
    row: &NormalizedRow,
  ) -> Result<ValidRow, ValidationErrors> {
    let (mut patch, mut errors) = self.check(row, true);
    let school_no = patch.school_no.take();
    match school_no {
      Some(school_no) if errors.is_empty() => Ok(ValidRow { school_no, patch }),
      Some(_) => Err(errors),
      None => {
        if errors.get(Field::SchoolNo).is_empty() {
          errors.add(Field::SchoolNo, Violation::Required);
        }
        Err(errors)
      }
    }
  }

  /// Validate a partial row for an edit: required fields may be absent, but
  /// must not be emptied when present.
  pub fn validate_partial(
    &self,
    row: &NormalizedRow,
  ) -> Result<SchoolPatch, ValidationErrors> {
    let (patch, errors) = self.check(row, false);
    if errors.is_empty() { Ok(patch) } else { Err(errors) }
  }

  fn check(
    &self,
    row: &NormalizedRow,
    require: bool,
  ) -> (SchoolPatch, ValidationErrors) {
    let mut c = Checker { row, require, errors: ValidationErrors::default() };
    let max = Some(MAX_STRING_LEN);

    let patch = SchoolPatch {
      school_no:        c.required(Field::SchoolNo, max, |_| None),
      school_census_no: c.optional(Field::SchoolCensusNo, max, |_| None),
      school_name_en:   c.required(Field::SchoolNameEn, max, |_| None),
      school_name_ta:   c.optional(Field::SchoolNameTa, max, |_| None),
      school_name_si:   c.optional(Field::SchoolNameSi, max, |_| None),
      school_type:      c
        .required(Field::SchoolType, None, |s| {
          SchoolType::from_str(s)
            .is_err()
            .then_some(Violation::NotAllowed { allowed: SCHOOL_TYPES })
        })
        .and_then(|s| SchoolType::from_str(&s).ok()),
      school_category:  c
        .required(Field::SchoolCategory, None, |s| {
          SchoolCategory::from_str(s)
            .is_err()
            .then_some(Violation::NotAllowed { allowed: SCHOOL_CATEGORIES })
        })
        .and_then(|s| SchoolCategory::from_str(&s).ok()),
      division:         c.optional(Field::Division, max, |_| None),
      zone:             c.optional(Field::Zone, max, |_| None),
      district:         c.optional(Field::District, max, |_| None),
      province:         c.optional(Field::Province, max, |_| None),
      address:          c.optional(Field::Address, None, |_| None),
      phone:            c.optional(Field::Phone, max, |_| None),
      email:            c.optional(Field::Email, max, |s| {
        (!is_valid_email(s)).then_some(Violation::InvalidEmail)
      }),
      website:          c.optional(Field::Website, max, |s| {
        (!is_valid_url(s)).then_some(Violation::InvalidUrl)
      }),
      established_year: c.integer(
        Field::EstablishedYear,
        MIN_ESTABLISHED_YEAR,
        i64::from(self.current_year),
      ),
      geo_lat:          c.numeric(Field::GeoLat, -90.0, 90.0),
      geo_lng:          c.numeric(Field::GeoLng, -180.0, 180.0),
      school_map_url:   c.optional(Field::SchoolMapUrl, None, |s| {
        (!is_valid_url(s)).then_some(Violation::InvalidUrl)
      }),
    };

    (patch, c.errors)
  }
}

// ─── Per-field checks ────────────────────────────────────────────────────────

struct Checker<'a> {
  row:     &'a NormalizedRow,
  require: bool,
  errors:  ValidationErrors,
}

impl Checker<'_> {
  /// Length and format checks shared by required and optional text. Returns
  /// the text only when it passed.
  fn text(
    &mut self,
    field: Field,
    text: String,
    max: Option<usize>,
    rule: impl Fn(&str) -> Option<Violation>,
  ) -> Option<String> {
    let mut ok = true;
    if let Some(max) = max
      && text.chars().count() > max
    {
      self.errors.add(field, Violation::TooLong { max });
      ok = false;
    }
    if let Some(violation) = rule(&text) {
      self.errors.add(field, violation);
      ok = false;
    }
    ok.then_some(text)
  }

  fn required(
    &mut self,
    field: Field,
    max: Option<usize>,
    rule: impl Fn(&str) -> Option<Violation>,
  ) -> Option<String> {
    match self.row.get(field) {
      None => {
        if self.require {
          self.errors.add(field, Violation::Required);
        }
        None
      }
      Some(value) => match value.render().filter(|s| !s.is_empty()) {
        None => {
          self.errors.add(field, Violation::Required);
          None
        }
        Some(text) => self.text(field, text, max, rule),
      },
    }
  }

  fn optional(
    &mut self,
    field: Field,
    max: Option<usize>,
    rule: impl Fn(&str) -> Option<Violation>,
  ) -> Option<Option<String>> {
    let value = self.row.get(field)?;
    match value.render().filter(|s| !s.is_empty()) {
      None => Some(None),
      Some(text) => self.text(field, text, max, rule).map(Some),
    }
  }

  fn integer(
    &mut self,
    field: Field,
    min: i64,
    max: i64,
  ) -> Option<Option<i32>> {
    let value = self.row.get(field)?;
    let n = match value {
      v if v.is_blank() => return Some(None),
      Scalar::Int(n) => Some(*n),
      Scalar::Float(x) if x.fract() == 0.0 => Some(*x as i64),
      Scalar::Text(s) => s.parse::<i64>().ok(),
      _ => None,
    };
    let Some(n) = n else {
      self.errors.add(field, Violation::NotInteger);
      return None;
    };
    match i32::try_from(n) {
      Ok(year) if (min..=max).contains(&n) => Some(Some(year)),
      _ => {
        self.errors.add(field, Violation::OutOfRange {
          min: min as f64,
          max: max as f64,
        });
        None
      }
    }
  }

  fn numeric(&mut self, field: Field, min: f64, max: f64) -> Option<Option<f64>> {
    let value = self.row.get(field)?;
    let x = match value {
      v if v.is_blank() => return Some(None),
      Scalar::Int(n) => Some(*n as f64),
      Scalar::Float(x) => Some(*x),
      Scalar::Text(s) => s.parse::<f64>().ok().filter(|x| x.is_finite()),
      Scalar::Null => None,
    };
    let Some(x) = x else {
      self.errors.add(field, Violation::NotNumeric);
      return None;
    };
    if (min..=max).contains(&x) {
      Some(Some(x))
    } else {
      self.errors.add(field, Violation::OutOfRange { min, max });
      None
    }
  }
}
