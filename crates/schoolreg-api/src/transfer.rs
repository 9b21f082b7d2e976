//! Handlers for spreadsheet import and export.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/import` | Body: `{"rows":[{field: value}]}` or `{"headers":[..],"rows":[[..]]}` |
//! | `GET`  | `/import/columns` | The import column table |
//! | `GET`  | `/export` | Same query params as `GET /schools` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use schoolreg_core::{
  field::Scalar,
  row::RawRow,
  store::{SchoolQuery, SchoolStore},
};
use schoolreg_import::{
  ColumnMap, Export, IMPORT_COLUMNS, ImportColumn, ImportReport, Importer,
  run_import,
};
use serde::Deserialize;

use crate::{AppState, actor::Actor, error::ApiError, schools::JsonRow};

/// The two shapes an import batch may arrive in.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImportBody {
  /// A header line plus positional cells; headers are mapped by guessing.
  Table {
    headers: Vec<String>,
    rows:    Vec<Vec<Scalar>>,
  },
  /// Rows already keyed by field name.
  Records { rows: Vec<JsonRow> },
}

impl ImportBody {
  pub fn into_rows(self) -> Result<Vec<RawRow>, ApiError> {
    match self {
      Self::Records { rows } => {
        Ok(rows.into_iter().map(RawRow::from_named).collect())
      }
      Self::Table { headers, rows } => {
        let map = ColumnMap::guess(&headers);
        map.ensure_complete()?;
        rows
          .into_iter()
          .map(|cells| map.row(cells))
          .collect::<schoolreg_import::Result<Vec<_>>>()
          .map_err(ApiError::from)
      }
    }
  }
}

/// `POST /import`
pub async fn import<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Json(body): Json<ImportBody>,
) -> Result<Json<ImportReport>, ApiError>
where
  S: SchoolStore + Clone + 'static,
{
  let rows = body.into_rows()?;
  let importer = Importer::new((*state.store).clone()).with_actor(actor);
  let report = run_import(Arc::new(importer), rows, state.import).await?;
  Ok(Json(report))
}

/// `GET /import/columns`
pub async fn columns() -> Json<&'static [ImportColumn]> { Json(IMPORT_COLUMNS) }

/// `GET /export`
pub async fn export<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Query(query): Query<SchoolQuery>,
) -> Result<Json<Export>, ApiError> {
  let schools = state.store.list(&query).await.map_err(ApiError::store)?;
  Ok(Json(schoolreg_import::export(&schools)))
}
