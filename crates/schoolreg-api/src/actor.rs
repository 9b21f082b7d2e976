//! Extraction of the acting user.

use axum::{extract::FromRequestParts, http::request::Parts};
use schoolreg_core::school::ActorId;

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The user on whose behalf a request runs, if the caller named one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor(pub Option<ActorId>);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(ACTOR_HEADER) else {
      return Ok(Self(None));
    };
    let id = value
      .to_str()
      .ok()
      .and_then(|s| s.trim().parse::<ActorId>().ok())
      .ok_or_else(|| {
        ApiError::BadRequest(format!("{ACTOR_HEADER} must be a UUID"))
      })?;
    Ok(Self(Some(id)))
  }
}
