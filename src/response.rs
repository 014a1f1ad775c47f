use serde::Serialize;

use crate::extractor::MediaInfo;
use crate::format::{FormatBucket, RawFormat};
use crate::search::SearchHit;
use crate::Error;

// fixed provenance fields, embedded in every success response
pub const CREATOR: &str = "mr senal";
pub const VERSION: &str = "v4-Production";

const DESCRIPTION_LIMIT: usize = 500;

// view counts come back numeric from yt-dlp but as display text from the
// search results page
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Views {
  Count(u64),
  Text(String),
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
  pub status: bool,
  pub creator: &'static str,
  pub version: &'static str,
  pub title: Option<String>,
  pub uploader: Option<String>,
  pub upload_date: Option<String>,
  pub views: Option<Views>,
  pub likes: Option<u64>,
  pub url: Option<String>,
}

impl SearchResponse {
  pub fn from_hit(hit: SearchHit) -> Self {
    let url = hit.watch_url();
    Self {
      status: true,
      creator: CREATOR,
      version: VERSION,
      title: hit.title,
      uploader: hit.channel,
      upload_date: hit.publish_time,
      views: hit.views.map(Views::Text),
      likes: None,
      url: Some(url),
    }
  }

  pub fn from_info(info: MediaInfo) -> Self {
    Self {
      status: true,
      creator: CREATOR,
      version: VERSION,
      title: info.title,
      uploader: info.uploader,
      upload_date: info.upload_date,
      views: info.view_count.map(Views::Count),
      likes: info.like_count,
      url: info.webpage_url,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
  pub status: bool,
  pub creator: &'static str,
  pub version: &'static str,
  pub title: Option<String>,
  pub thumbnail: Option<String>,
  pub duration: Option<f64>,
  pub uploader: Option<String>,
  pub view_count: Option<u64>,
  pub like_count: Option<u64>,
  pub description: Option<String>,
  pub formats: FormatBucket,
}

impl DownloadResponse {
  pub fn compose(info: MediaInfo, formats: FormatBucket) -> Self {
    Self {
      status: true,
      creator: CREATOR,
      version: VERSION,
      title: info.title,
      thumbnail: info.thumbnail,
      duration: info.duration,
      uploader: info.uploader,
      view_count: info.view_count,
      like_count: info.like_count,
      description: info
        .description
        .as_deref()
        .map(|d| truncate_chars(d, DESCRIPTION_LIMIT)),
      formats,
    }
  }
}

// flat per-format schema for the transparency endpoint. Deliberately not
// policy-filtered: it shows everything with a url, manifests included.
#[derive(Debug, Serialize)]
pub struct DisplayFormat {
  pub format_id: Option<String>,
  pub ext: Option<String>,
  pub resolution: String,
  pub fps: Option<f64>,
  pub vcodec: Option<String>,
  pub acodec: Option<String>,
  pub abr: Option<f64>,
  pub vbr: Option<f64>,
  pub tbr: Option<f64>,
  pub filesize: Option<u64>,
  pub protocol: Option<String>,
  pub url: String,
}

impl DisplayFormat {
  fn from_raw(raw: &RawFormat) -> Option<Self> {
    let url = raw.url.clone().filter(|u| !u.is_empty())?;
    let height = raw.height.unwrap_or(0);

    Some(Self {
      format_id: raw.format_id.clone(),
      ext: raw.ext.clone(),
      resolution: if height > 0 {
        format!("{}p", height)
      } else {
        "audio".to_string()
      },
      fps: raw.fps,
      vcodec: raw.vcodec.clone(),
      acodec: raw.acodec.clone(),
      abr: raw.abr,
      vbr: raw.vbr,
      tbr: raw.tbr,
      filesize: raw.filesize(),
      protocol: raw.protocol.clone(),
      url,
    })
  }
}

#[derive(Debug, Serialize)]
pub struct AllFormatsResponse {
  pub status: bool,
  pub creator: &'static str,
  pub version: &'static str,
  pub title: Option<String>,
  pub thumbnail: Option<String>,
  pub duration: Option<f64>,
  pub total_formats: usize,
  pub formats: Vec<DisplayFormat>,
}

impl AllFormatsResponse {
  pub fn compose(info: MediaInfo) -> Self {
    let formats: Vec<DisplayFormat> =
      info.formats.iter().filter_map(DisplayFormat::from_raw).collect();

    Self {
      status: true,
      creator: CREATOR,
      version: VERSION,
      title: info.title,
      thumbnail: info.thumbnail,
      duration: info.duration,
      total_formats: formats.len(),
      formats,
    }
  }
}

// extraction and search failures are reported in-band with http 200
#[derive(Debug, Serialize)]
pub struct Failure {
  pub status: bool,
  pub error: String,
}

impl From<Error> for Failure {
  fn from(err: Error) -> Self {
    Self {
      status: false,
      error: err.to_string(),
    }
  }
}

fn truncate_chars(s: &str, max: usize) -> String {
  s.chars().take(max).collect()
}
