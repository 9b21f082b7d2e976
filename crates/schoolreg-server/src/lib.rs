//! School registry HTTP server: configuration, router assembly, and seeding.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use config::{ConfigBuilder, builder::DefaultState};
use schoolreg_core::{seed::seed_schools, store::SchoolStore};
use schoolreg_import::{ImportOptions, ImportReport, Importer, run_import};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Server configuration, loaded from `schoolreg.toml` and `SCHOOLREG_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub import_chunk_size:  usize,
  pub import_concurrency: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let import = ImportOptions::default();
    Self {
      host:               "127.0.0.1".to_string(),
      port:               8080,
      store_path:         PathBuf::from("schoolreg.db"),
      import_chunk_size:  import.chunk_size,
      import_concurrency: import.concurrency,
    }
  }
}

impl ServerConfig {
  /// Read the optional TOML file at `path`, overlaid by the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      config::Config::builder()
        .add_source(config::File::from(path).required(false)),
    )
  }

  /// Finish `builder` with the environment source and deserialize.
  pub fn from_builder(
    builder: ConfigBuilder<DefaultState>,
  ) -> anyhow::Result<Self> {
    builder
      .add_source(config::Environment::with_prefix("SCHOOLREG"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn import_options(&self) -> ImportOptions {
    ImportOptions {
      chunk_size:  self.import_chunk_size,
      concurrency: self.import_concurrency,
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ─────────────────────────────────────────────────────────────

/// The API mounted under `/api`, with request tracing.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: SchoolStore + Clone + 'static,
{
  Router::new()
    .nest("/api", schoolreg_api::api_router(store, config.import_options()))
    .layer(TraceLayer::new_for_http())
}

/// Run the fixture schools through the import pipeline. Seeding twice updates
/// the same records.
pub async fn seed<S>(
  store: S,
  options: ImportOptions,
) -> schoolreg_import::Result<ImportReport>
where
  S: SchoolStore + 'static,
{
  run_import(Arc::new(Importer::new(store)), seed_schools(), options).await
}
