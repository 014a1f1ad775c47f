use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::StatusCode;
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Parameter {0} is required")]
  MissingParameter(&'static str),

  #[error("No results found")]
  NoSearchResult,

  // anything yt-dlp itself failed on: network, geo-block, age restriction,
  // removed video, bot-detection challenge
  #[error("{0}")]
  Extraction(String),

  #[error("search request failed: {0}")]
  SearchRequest(#[from] reqwest::Error),

  #[error("malformed search page: {0}")]
  SearchParse(&'static str),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  IO(#[from] std::io::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::MissingParameter(_) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": self.to_string() })),
      )
        .into_response(),
      err => {
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
      }
    }
  }
}
