//! Handlers for the bulk lifecycle actions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/schools/bulk/delete` | Body: `{"ids":[..]}` |
//! | `POST` | `/schools/bulk/restore` | Body: `{"ids":[..]}` |
//! | `POST` | `/schools/bulk/force-delete` | Body: `{"ids":[..]}` |
//!
//! Ids that name no record are reported back rather than failing the request.

use axum::{Json, extract::State};
use schoolreg_core::{
  school::ActorId,
  store::{SchoolStore, StoreError},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, actor::Actor, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct BulkBody {
  pub ids: Vec<Uuid>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
  pub affected: usize,
  pub missing:  Vec<Uuid>,
}

#[derive(Debug, Clone, Copy)]
enum Action {
  Trash(Option<ActorId>),
  Restore,
  ForceDelete,
}

async fn apply<S: SchoolStore>(
  store: &S,
  ids: Vec<Uuid>,
  action: Action,
) -> Result<BulkOutcome, ApiError> {
  let mut outcome = BulkOutcome::default();
  for id in ids {
    let result = match action {
      Action::Trash(actor) => store.soft_delete(id, actor).await.map(drop),
      Action::Restore => store.restore(id).await.map(drop),
      Action::ForceDelete => store.force_delete(id).await,
    };
    match result {
      Ok(()) => outcome.affected += 1,
      Err(e) if e.is_not_found() => outcome.missing.push(id),
      Err(e) => return Err(ApiError::store(e)),
    }
  }
  info!(?action, affected = outcome.affected, missing = outcome.missing.len(), "bulk action");
  Ok(outcome)
}

/// `POST /schools/bulk/delete`
pub async fn trash<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  Json(body): Json<BulkBody>,
) -> Result<Json<BulkOutcome>, ApiError> {
  Ok(Json(apply(&*state.store, body.ids, Action::Trash(actor)).await?))
}

/// `POST /schools/bulk/restore`
pub async fn restore<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<BulkBody>,
) -> Result<Json<BulkOutcome>, ApiError> {
  Ok(Json(apply(&*state.store, body.ids, Action::Restore).await?))
}

/// `POST /schools/bulk/force-delete`
pub async fn force_delete<S: SchoolStore>(
  State(state): State<AppState<S>>,
  Json(body): Json<BulkBody>,
) -> Result<Json<BulkOutcome>, ApiError> {
  Ok(Json(apply(&*state.store, body.ids, Action::ForceDelete).await?))
}
