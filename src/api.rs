use std::sync::{Arc, LazyLock};

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::config::Policy;
use crate::extractor::{Extractor, FormatSelector, Target, Ytdlp};
use crate::format::FormatBucket;
use crate::response::{
  AllFormatsResponse, DownloadResponse, Failure, SearchResponse,
};
use crate::{search, Error, Result};

const GET_PARAMS: &str = "'url' or 'q'";
const POST_FIELDS: &str = "'url' or 'query'";

#[derive(Clone)]
pub struct AppState {
  pub ytdlp: Arc<Ytdlp>,
  pub policy: Policy,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
  url: Option<String>,
  q: Option<String>,
  query: Option<String>,
  quality: Option<String>,
}

impl LookupParams {
  // `url` wins over the query aliases
  fn target(self, missing: &'static str) -> Result<Target> {
    self
      .url
      .or(self.q)
      .or(self.query)
      .map(Target::from_input)
      .ok_or(Error::MissingParameter(missing))
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupBody {
  url: Option<String>,
  query: Option<String>,
}

impl LookupBody {
  fn target(self) -> Result<Target> {
    self
      .url
      .or(self.query)
      .map(Target::from_input)
      .ok_or(Error::MissingParameter(POST_FIELDS))
  }
}

// digits buried in a free-form quality string: "720p" -> 720, "hd1080" -> 1080
static QUALITY_DIGITS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

fn parse_quality(quality: Option<&str>) -> Option<u32> {
  let quality = quality?;
  QUALITY_DIGITS
    .captures(quality)
    .and_then(|caps| caps[1].parse().ok())
}

pub async fn search_get(
  State(state): State<AppState>,
  Query(params): Query<LookupParams>,
) -> Result<Response> {
  let target = params.target(GET_PARAMS)?;
  Ok(search_for(&state, target).await)
}

pub async fn search_post(
  State(state): State<AppState>,
  Json(body): Json<LookupBody>,
) -> Result<Response> {
  let target = body.target()?;
  Ok(search_for(&state, target).await)
}

pub async fn download_get(
  State(state): State<AppState>,
  Query(params): Query<LookupParams>,
) -> Result<Response> {
  let quality = parse_quality(params.quality.as_deref());
  let target = params.target(GET_PARAMS)?;
  Ok(download_for(&state, target, quality).await)
}

pub async fn download_post(
  State(state): State<AppState>,
  Query(params): Query<LookupParams>,
  Json(body): Json<LookupBody>,
) -> Result<Response> {
  let quality = parse_quality(params.quality.as_deref());
  let target = body.target()?;
  Ok(download_for(&state, target, quality).await)
}

pub async fn formats_get(
  State(state): State<AppState>,
  Query(params): Query<LookupParams>,
) -> Result<Response> {
  let target = params.target(GET_PARAMS)?;
  Ok(formats_for(&state, target).await)
}

pub async fn formats_post(
  State(state): State<AppState>,
  Json(body): Json<LookupBody>,
) -> Result<Response> {
  let target = body.target()?;
  Ok(formats_for(&state, target).await)
}

// Free text goes through the results-page scraper (first hit wins); real
// urls go through yt-dlp metadata extraction. Failures are reported
// in-band, never as http errors.
async fn search_for(state: &AppState, target: Target) -> Response {
  match target {
    Target::Query(ref query) => match search::search(query, 1).await {
      Ok(hits) => match hits.into_iter().next() {
        Some(hit) => Json(SearchResponse::from_hit(hit)).into_response(),
        None => failure(Error::NoSearchResult),
      },
      Err(err) => failure(err),
    },
    Target::Url(_) => {
      match state.ytdlp.extract(&target, &FormatSelector::Best).await {
        Ok(info) => Json(SearchResponse::from_info(info)).into_response(),
        Err(err) => failure(err),
      }
    }
  }
}

async fn download_for(
  state: &AppState,
  target: Target,
  quality: Option<u32>,
) -> Response {
  let selector = FormatSelector::Merged {
    max_height: quality,
  };

  match state.ytdlp.extract(&target, &selector).await {
    Ok(info) => {
      let mut bucket = FormatBucket::collect(&info.formats, &state.policy);
      if let Some(max_height) = quality {
        bucket.cap_video_height(max_height);
      }
      Json(DownloadResponse::compose(info, bucket)).into_response()
    }
    Err(err) => failure(err),
  }
}

async fn formats_for(state: &AppState, target: Target) -> Response {
  match state.ytdlp.extract(&target, &FormatSelector::All).await {
    Ok(info) => Json(AllFormatsResponse::compose(info)).into_response(),
    Err(err) => failure(err),
  }
}

fn failure(err: Error) -> Response {
  Json(Failure::from(err)).into_response()
}

pub async fn usage() -> impl IntoResponse {
  Json(json!({
    "status": true,
    "creator": crate::response::CREATOR,
    "version": crate::response::VERSION,
    "message": "YouTube link resolver API",
    "endpoints": {
      "/search": "Video info - ?q=video+title or ?url=VIDEO_URL",
      "/download": "Direct download links - ?url=VIDEO_URL&quality=720",
      "/formats": "Every available format - ?url=VIDEO_URL",
    },
    "usage_examples": {
      "search_by_query": "/search?q=despacito",
      "search_by_url": "/search?url=https://youtu.be/VIDEO_ID",
      "download_720p": "/download?url=https://youtu.be/VIDEO_ID&quality=720",
      "download_best": "/download?url=https://youtu.be/VIDEO_ID",
      "all_formats": "/formats?url=https://youtu.be/VIDEO_ID",
    },
  }))
}

pub async fn health() -> impl IntoResponse {
  "ok".to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quality_digits_are_extracted_from_free_form_strings() {
    assert_eq!(parse_quality(Some("720p")), Some(720));
    assert_eq!(parse_quality(Some("hd1080")), Some(1080));
    assert_eq!(parse_quality(Some("480")), Some(480));
    assert_eq!(parse_quality(Some("best")), None);
    assert_eq!(parse_quality(None), None);
  }

  #[test]
  fn url_param_takes_precedence_over_query() {
    let params = LookupParams {
      url: Some("https://youtu.be/abc".to_string()),
      q: Some("some text".to_string()),
      ..Default::default()
    };
    assert_eq!(
      params.target(GET_PARAMS).unwrap(),
      Target::Url("https://youtu.be/abc".to_string())
    );
  }

  #[test]
  fn query_aliases_are_accepted() {
    let params = LookupParams {
      query: Some("despacito".to_string()),
      ..Default::default()
    };
    assert_eq!(
      params.target(GET_PARAMS).unwrap(),
      Target::Query("despacito".to_string())
    );
  }

  #[test]
  fn missing_params_name_the_expected_parameters() {
    let err = LookupParams::default().target(GET_PARAMS).unwrap_err();
    assert_eq!(err.to_string(), "Parameter 'url' or 'q' is required");

    let err = LookupBody::default().target().unwrap_err();
    assert_eq!(err.to_string(), "Parameter 'url' or 'query' is required");
  }
}
