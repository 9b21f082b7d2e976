//! [`SqliteStore`], the SQLite implementation of [`SchoolStore`].

use std::{path::Path, str::FromStr};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use tracing::debug;
use uuid::Uuid;

use schoolreg_core::{
  field::Field,
  lifecycle::TrashedFilter,
  school::{ActorId, NewSchool, School},
  store::{SchoolQuery, SchoolStore, UniqueViolation},
};

use crate::{
  Error, Result,
  encode::{RawSchool, SCHOOL_COLUMNS, encode_dt, encode_uuid},
  schema::SCHEMA,
};

/// Columns the free-text search looks at.
const SEARCH_COLUMNS: &[&str] = &[
  "school_no",
  "school_census_no",
  "school_name_en",
  "division",
  "zone",
  "district",
  "province",
  "phone",
  "email",
  "website",
];

// ─── Store ───────────────────────────────────────────────────────────────────

/// A school directory backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a school that must exist.
  async fn require(&self, id: Uuid) -> Result<School> {
    self.get(id).await?.ok_or(Error::NotFound(id))
  }
}

// ─── Constraint mapping ──────────────────────────────────────────────────────

/// The field behind a `UNIQUE constraint failed: schools.<column>` error.
fn unique_field(err: &tokio_rusqlite::Error) -> Option<Field> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    failure,
    Some(message),
  )) = err
  else {
    return None;
  };
  if failure.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }
  let column = message.strip_prefix("UNIQUE constraint failed: schools.")?;
  Field::from_str(column).ok()
}

/// Turn a failed write of `school` into a [`UniqueViolation`] when a unique
/// column rejected it.
fn write_error(err: tokio_rusqlite::Error, school: &School) -> Error {
  let value = match unique_field(&err) {
    Some(Field::SchoolNo) => Some((Field::SchoolNo, school.school_no.clone())),
    Some(Field::SchoolCensusNo) => school
      .school_census_no
      .clone()
      .map(|v| (Field::SchoolCensusNo, v)),
    _ => None,
  };
  match value {
    Some((field, value)) => Error::UniqueViolation(UniqueViolation { field, value }),
    None => Error::Database(err),
  }
}

/// Positional values for the 26 columns, in [`SCHOOL_COLUMNS`] order.
fn school_values(s: &School) -> Vec<Value> {
  let text = |v: &Option<String>| v.clone().map_or(Value::Null, Value::Text);
  let actor = |v: Option<ActorId>| v.map_or(Value::Null, |id| Value::Text(encode_uuid(id)));

  vec![
    Value::Text(encode_uuid(s.school_id)),
    Value::Text(s.school_no.clone()),
    text(&s.school_census_no),
    Value::Text(s.school_name_en.clone()),
    text(&s.school_name_ta),
    text(&s.school_name_si),
    Value::Text(s.school_type.as_str().to_owned()),
    Value::Text(s.school_category.as_str().to_owned()),
    text(&s.division),
    text(&s.zone),
    text(&s.district),
    text(&s.province),
    text(&s.address),
    text(&s.phone),
    text(&s.email),
    text(&s.website),
    s.established_year.map_or(Value::Null, |y| Value::Integer(y.into())),
    s.geo_lat.map_or(Value::Null, Value::Real),
    s.geo_lng.map_or(Value::Null, Value::Real),
    text(&s.school_map_url),
    actor(s.created_by),
    actor(s.updated_by),
    actor(s.deleted_by),
    Value::Text(encode_dt(s.created_at)),
    Value::Text(encode_dt(s.updated_at)),
    s.deleted_at.map_or(Value::Null, |at| Value::Text(encode_dt(at))),
  ]
}

fn escape_like(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// Build the `SELECT` for a listing and its positional parameters.
fn list_sql(query: &SchoolQuery) -> (String, Vec<Value>) {
  let mut conds: Vec<String> = vec![];
  let mut values: Vec<Value> = vec![];

  match query.trashed {
    TrashedFilter::Without => conds.push("deleted_at IS NULL".into()),
    TrashedFilter::With => {}
    TrashedFilter::Only => conds.push("deleted_at IS NOT NULL".into()),
  }
  if let Some(t) = query.school_type {
    conds.push("school_type = ?".into());
    values.push(Value::Text(t.as_str().to_owned()));
  }
  if let Some(c) = query.school_category {
    conds.push("school_category = ?".into());
    values.push(Value::Text(c.as_str().to_owned()));
  }
  if let Some(p) = &query.province {
    conds.push("province = ?".into());
    values.push(Value::Text(p.clone()));
  }
  for (column, want) in [("email", query.has_email), ("website", query.has_website)] {
    match want {
      Some(true) => conds.push(format!("({column} IS NOT NULL AND {column} != '')")),
      Some(false) => conds.push(format!("({column} IS NULL OR {column} = '')")),
      None => {}
    }
  }
  if let Some(needle) = query.search.as_deref().filter(|s| !s.is_empty()) {
    let pattern = format!("%{}%", escape_like(needle));
    let clause = SEARCH_COLUMNS
      .iter()
      .map(|c| format!("{c} LIKE ? ESCAPE '\\'"))
      .collect::<Vec<_>>()
      .join(" OR ");
    conds.push(format!("({clause})"));
    values.extend(SEARCH_COLUMNS.iter().map(|_| Value::Text(pattern.clone())));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  let direction = if query.descending { "DESC" } else { "ASC" };

  let mut sql = format!(
    "SELECT {SCHOOL_COLUMNS} FROM schools {where_clause}
     ORDER BY {} {direction}, school_no ASC",
    query.sort.column()
  );
  if query.limit.is_some() || query.offset.is_some() {
    sql.push_str(" LIMIT ? OFFSET ?");
    let bound = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
    values.push(Value::Integer(query.limit.map_or(-1, bound)));
    values.push(Value::Integer(query.offset.map_or(0, bound)));
  }

  (sql, values)
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = Error;

  async fn find_by_key(&self, school_no: &str) -> Result<Option<School>> {
    let school_no = school_no.to_owned();

    let raw: Option<RawSchool> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SCHOOL_COLUMNS} FROM schools
                 WHERE school_no = ?1 AND deleted_at IS NULL"
              ),
              rusqlite::params![school_no],
              RawSchool::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSchool::into_school).transpose()
  }

  async fn get(&self, id: Uuid) -> Result<Option<School>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSchool> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE school_id = ?1"),
              rusqlite::params![id_str],
              RawSchool::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSchool::into_school).transpose()
  }

  async fn create(&self, input: NewSchool) -> Result<School> {
    let now = Utc::now();
    let school = School {
      school_id:        Uuid::new_v4(),
      school_no:        input.school_no,
      school_census_no: input.school_census_no,
      school_name_en:   input.school_name_en,
      school_name_ta:   input.school_name_ta,
      school_name_si:   input.school_name_si,
      school_type:      input.school_type,
      school_category:  input.school_category,
      division:         input.division,
      zone:             input.zone,
      district:         input.district,
      province:         input.province,
      address:          input.address,
      phone:            input.phone,
      email:            input.email,
      website:          input.website,
      established_year: input.established_year,
      geo_lat:          input.geo_lat,
      geo_lng:          input.geo_lng,
      school_map_url:   input.school_map_url,
      created_by:       input.created_by,
      updated_by:       input.created_by,
      deleted_by:       None,
      created_at:       now,
      updated_at:       now,
      deleted_at:       None,
    };

    let values = school_values(&school);
    let placeholders = vec!["?"; values.len()].join(", ");

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO schools ({SCHOOL_COLUMNS}) VALUES ({placeholders})"
          ),
          rusqlite::params_from_iter(values),
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, &school))?;

    debug!(school_no = %school.school_no, school_id = %school.school_id, "school created");
    Ok(school)
  }

  async fn update(&self, mut school: School) -> Result<School> {
    school.updated_at = Utc::now();
    let id = school.school_id;

    // Every column but the id is rewritten.
    let mut values = school_values(&school);
    let id_value = values.remove(0);
    let assignments = SCHOOL_COLUMNS
      .split(", ")
      .skip(1)
      .map(|c| format!("{c} = ?"))
      .collect::<Vec<_>>()
      .join(", ");
    values.push(id_value);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("UPDATE schools SET {assignments} WHERE school_id = ?"),
          rusqlite::params_from_iter(values),
        )?)
      })
      .await
      .map_err(|e| write_error(e, &school))?;

    if changed == 0 {
      return Err(Error::NotFound(id));
    }
    debug!(school_no = %school.school_no, school_id = %id, "school updated");
    Ok(school)
  }

  async fn soft_delete(&self, id: Uuid, actor: Option<ActorId>) -> Result<School> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());
    let actor_str = actor.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE schools SET deleted_at = ?2, deleted_by = ?3, updated_at = ?2
           WHERE school_id = ?1 AND deleted_at IS NULL",
          rusqlite::params![id_str, at_str, actor_str],
        )?;
        Ok(())
      })
      .await?;

    self.require(id).await
  }

  async fn restore(&self, id: Uuid) -> Result<School> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE schools SET deleted_at = NULL, deleted_by = NULL, updated_at = ?2
           WHERE school_id = ?1 AND deleted_at IS NOT NULL",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    self.require(id).await
  }

  async fn force_delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM schools WHERE school_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn list(&self, query: &SchoolQuery) -> Result<Vec<School>> {
    let (sql, values) = list_sql(query);

    let raws: Vec<RawSchool> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values), RawSchool::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSchool::into_school).collect()
  }

  async fn distinct_provinces(&self) -> Result<Vec<String>> {
    let provinces = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT province FROM schools
           WHERE deleted_at IS NULL AND province IS NOT NULL AND province != ''
           ORDER BY province",
        )?;
        let rows = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(provinces)
  }
}
