use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

mod api;
mod config;
mod error;
mod extractor;
mod format;
mod response;
mod search;

pub use error::{Error, Result};

use api::AppState;
use config::Config;
use extractor::Ytdlp;

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let config = Config::from_env();
  let state = AppState {
    ytdlp: Arc::new(Ytdlp::new(&config)?),
    policy: config.profile.policy(),
  };

  // the api is meant to be called from anywhere, including browsers
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  let app = Router::new()
    .route("/", get(api::usage))
    .route("/health", get(api::health))
    .route("/search", get(api::search_get).post(api::search_post))
    .route("/download", get(api::download_get).post(api::download_post))
    .route("/formats", get(api::formats_get).post(api::formats_post))
    .layer(cors)
    .with_state(state);

  info!(
    "listening on {} ({:?} profile)",
    config.listen_addr, config.profile
  );

  axum::Server::bind(&config.listen_addr)
    .serve(app.into_make_service())
    .await
    .expect("Failed to start server");

  Ok(())
}
