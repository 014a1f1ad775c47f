mod ytdlp;

use async_trait::async_trait;
use serde::Deserialize;

use crate::format::RawFormat;
use crate::Result;

pub use ytdlp::Ytdlp;

// What the caller asked us to look up. Anything without an http(s) scheme
// is treated as a free-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  Url(String),
  Query(String),
}

impl Target {
  pub fn from_input(input: String) -> Self {
    if input.starts_with("http://") || input.starts_with("https://") {
      Target::Url(input)
    } else {
      Target::Query(input)
    }
  }

  // queries go through yt-dlp's search pseudo-url, first hit only
  pub fn as_arg(&self) -> String {
    match self {
      Target::Url(url) => url.clone(),
      Target::Query(query) => format!("ytsearch1:{}", query),
    }
  }
}

// yt-dlp `-f` selector per endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelector {
  Best,
  Merged { max_height: Option<u32> },
  All,
}

impl FormatSelector {
  pub fn as_arg(&self) -> String {
    match self {
      FormatSelector::Best => "best".to_string(),
      FormatSelector::Merged { max_height: None } => {
        "bestvideo+bestaudio/best".to_string()
      }
      FormatSelector::Merged {
        max_height: Some(h),
      } => {
        format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]/best")
      }
      FormatSelector::All => "all".to_string(),
    }
  }
}

// Top-level metadata for one video, straight out of yt-dlp. All scalars are
// passthrough, present-or-null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
  pub title: Option<String>,
  pub uploader: Option<String>,
  pub upload_date: Option<String>,
  pub webpage_url: Option<String>,
  pub view_count: Option<u64>,
  pub like_count: Option<u64>,
  pub duration: Option<f64>,
  pub thumbnail: Option<String>,
  pub description: Option<String>,
  #[serde(default)]
  pub formats: Vec<RawFormat>,
}

#[async_trait]
pub trait Extractor {
  async fn extract(
    &self,
    target: &Target,
    selector: &FormatSelector,
  ) -> Result<MediaInfo>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scheme_decides_between_url_and_query() {
    assert_eq!(
      Target::from_input("https://youtu.be/abc".to_string()),
      Target::Url("https://youtu.be/abc".to_string())
    );
    assert_eq!(
      Target::from_input("despacito".to_string()),
      Target::Query("despacito".to_string())
    );
  }

  #[test]
  fn queries_become_ytsearch_pseudo_urls() {
    let target = Target::from_input("never gonna give you up".to_string());
    assert_eq!(target.as_arg(), "ytsearch1:never gonna give you up");
  }

  #[test]
  fn selector_strings() {
    assert_eq!(FormatSelector::Best.as_arg(), "best");
    assert_eq!(FormatSelector::All.as_arg(), "all");
    assert_eq!(
      FormatSelector::Merged { max_height: None }.as_arg(),
      "bestvideo+bestaudio/best"
    );
    assert_eq!(
      FormatSelector::Merged {
        max_height: Some(480)
      }
      .as_arg(),
      "bestvideo[height<=480]+bestaudio/best[height<=480]/best"
    );
  }
}
