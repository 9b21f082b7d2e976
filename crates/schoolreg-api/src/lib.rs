//! JSON REST API for the school registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`schoolreg_core::store::SchoolStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility; the acting user arrives in the
//! `x-actor-id` header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", schoolreg_api::api_router(store.clone(), ImportOptions::default()))
//! ```

pub mod actor;
pub mod bulk;
pub mod error;
pub mod schools;
pub mod transfer;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use schoolreg_core::store::SchoolStore;
use schoolreg_import::ImportOptions;

pub use actor::{ACTOR_HEADER, Actor};
pub use error::ApiError;

/// Shared handler state.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub import: ImportOptions,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), import: self.import }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, import: ImportOptions) -> Router<()>
where
  S: SchoolStore + Clone + 'static,
{
  Router::new()
    // Schools
    .route("/schools", get(schools::list::<S>).post(schools::create::<S>))
    .route("/schools/provinces", get(schools::provinces::<S>))
    .route(
      "/schools/{id}",
      get(schools::get_one::<S>)
        .patch(schools::update::<S>)
        .delete(schools::trash::<S>),
    )
    .route("/schools/{id}/restore", post(schools::restore::<S>))
    .route("/schools/{id}/force", delete(schools::force_delete::<S>))
    // Bulk lifecycle
    .route("/schools/bulk/delete", post(bulk::trash::<S>))
    .route("/schools/bulk/restore", post(bulk::restore::<S>))
    .route("/schools/bulk/force-delete", post(bulk::force_delete::<S>))
    // Import and export
    .route("/import", post(transfer::import::<S>))
    .route("/import/columns", get(transfer::columns))
    .route("/export", get(transfer::export::<S>))
    .with_state(AppState { store, import })
}
