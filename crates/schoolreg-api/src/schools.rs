//! Handlers for `/schools` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/schools` | Query params of [`SchoolQuery`] |
//! | `POST`   | `/schools` | Body: `{field: value}`; 201, 409 on a taken key |
//! | `GET`    | `/schools/provinces` | Non-empty provinces of live records |
//! | `GET`    | `/schools/{id}` | Includes trashed records; 404 if missing |
//! | `PATCH`  | `/schools/{id}` | Body: `{field: value}`; absent fields untouched |
//! | `DELETE` | `/schools/{id}` | Soft delete |
//! | `POST`   | `/schools/{id}/restore` | |
//! | `DELETE` | `/schools/{id}/force` | Physical delete; 204 |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use schoolreg_core::{
  field::Scalar,
  lifecycle::SchoolView,
  normalize::normalize,
  row::RawRow,
  school::{NewSchool, School},
  store::{SchoolQuery, SchoolStore},
  validate::Validator,
};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, actor::Actor, error::ApiError};

/// A row as posted by a client: field names to cell values. Names that are
/// not fields are ignored.
pub type JsonRow = BTreeMap<String, Scalar>;

pub(crate) async fn fetch<S: SchoolStore>(
  store: &S,
  id: Uuid,
) -> Result<School, ApiError> {
  store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("school {id} not found")))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /schools[?search=..&school_type=..&trashed=with&sort=..]`
pub async fn list<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Query(query): Query<SchoolQuery>,
) -> Result<Json<Vec<SchoolView>>, ApiError> {
  let schools = state.store.list(&query).await.map_err(ApiError::store)?;
  Ok(Json(schools.into_iter().map(SchoolView::from).collect()))
}

/// `GET /schools/provinces`
pub async fn provinces<S: SchoolStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<String>>, ApiError> {
  let provinces = state
    .store
    .distinct_provinces()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(provinces))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /schools`
pub async fn create<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Json(body): Json<JsonRow>,
) -> Result<impl IntoResponse, ApiError> {
  let row = normalize(RawRow::from_named(body));
  let valid = Validator::current()
    .validate(&row)
    .map_err(ApiError::Validation)?;
  let new = NewSchool {
    created_by: actor,
    ..NewSchool::from_patch(valid.school_no, valid.patch)?
  };

  let school = state.store.create(new).await.map_err(ApiError::store)?;
  info!(school_id = %school.school_id, school_no = %school.school_no, "school created");
  Ok((StatusCode::CREATED, Json(SchoolView::from(school))))
}

// ─── Get one / update ────────────────────────────────────────────────────────

/// `GET /schools/{id}`
pub async fn get_one<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SchoolView>, ApiError> {
  Ok(Json(fetch(&*state.store, id).await?.into()))
}

/// `PATCH /schools/{id}`
pub async fn update<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
  Json(body): Json<JsonRow>,
) -> Result<Json<SchoolView>, ApiError> {
  let patch = Validator::current()
    .validate_partial(&normalize(RawRow::from_named(body)))
    .map_err(ApiError::Validation)?;

  let mut school = fetch(&*state.store, id).await?;
  school.apply(patch);
  school.updated_by = actor;
  let school = state.store.update(school).await.map_err(ApiError::store)?;
  info!(school_id = %id, "school updated");
  Ok(Json(school.into()))
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// `DELETE /schools/{id}`
pub async fn trash<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Actor(actor): Actor,
) -> Result<Json<SchoolView>, ApiError> {
  let school = state
    .store
    .soft_delete(id, actor)
    .await
    .map_err(ApiError::store)?;
  info!(school_id = %id, "school trashed");
  Ok(Json(school.into()))
}

/// `POST /schools/{id}/restore`
pub async fn restore<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SchoolView>, ApiError> {
  let school = state.store.restore(id).await.map_err(ApiError::store)?;
  info!(school_id = %id, "school restored");
  Ok(Json(school.into()))
}

/// `DELETE /schools/{id}/force`
pub async fn force_delete<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.store.force_delete(id).await.map_err(ApiError::store)?;
  info!(school_id = %id, "school force deleted");
  Ok(StatusCode::NO_CONTENT)
}
