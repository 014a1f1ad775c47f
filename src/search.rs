use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{Error, Result};

const RESULTS_URL: &str = "https://www.youtube.com/results";

// Minimal video summary scraped from the search results page. The results
// page has no likes data, so search responses never carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
  pub id: String,
  pub title: Option<String>,
  pub channel: Option<String>,
  pub publish_time: Option<String>,
  pub views: Option<String>,
}

impl SearchHit {
  pub fn watch_url(&self) -> String {
    format!("https://www.youtube.com/watch?v={}", self.id)
  }
}

pub async fn search(query: &str, limit: usize) -> Result<Vec<SearchHit>> {
  let html = reqwest::Client::new()
    .get(RESULTS_URL)
    .query(&[("search_query", query)])
    .header("User-Agent", "Mozilla/5.0")
    .header("Accept-Language", "en-US,en;q=0.9")
    .send()
    .await?
    .text()
    .await?;

  let data = extract_initial_data(&html)?;
  Ok(collect_hits(&data, limit))
}

static INITIAL_DATA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)var ytInitialData\s*=\s*(\{.*?\});\s*</script>").unwrap()
});

fn extract_initial_data(html: &str) -> Result<Value> {
  let captures = INITIAL_DATA_REGEX
    .captures(html)
    .ok_or(Error::SearchParse("ytInitialData not found"))?;

  serde_json::from_str(&captures[1])
    .map_err(|_| Error::SearchParse("ytInitialData is not valid json"))
}

// results live under a fixed (if deeply nested) path:
// contents > twoColumnSearchResultsRenderer > primaryContents >
// sectionListRenderer > contents[] > itemSectionRenderer > contents[] >
// videoRenderer
fn collect_hits(data: &Value, limit: usize) -> Vec<SearchHit> {
  let sections = data["contents"]["twoColumnSearchResultsRenderer"]
    ["primaryContents"]["sectionListRenderer"]["contents"]
    .as_array()
    .map(Vec::as_slice)
    .unwrap_or_default();

  let mut hits = Vec::new();
  for section in sections {
    let items = section["itemSectionRenderer"]["contents"]
      .as_array()
      .map(Vec::as_slice)
      .unwrap_or_default();

    for item in items {
      // non-video entries (ads, shelves, channels) have no videoRenderer
      let renderer = &item["videoRenderer"];
      let Some(id) = renderer["videoId"].as_str() else {
        continue;
      };

      hits.push(SearchHit {
        id: id.to_string(),
        title: text_of(&renderer["title"]),
        channel: text_of(&renderer["ownerText"]),
        publish_time: text_of(&renderer["publishedTimeText"]),
        views: text_of(&renderer["viewCountText"]),
      });

      if hits.len() >= limit {
        return hits;
      }
    }
  }

  hits
}

// youtube text nodes come either as {"runs":[{"text":..}]} or {"simpleText":..}
fn text_of(node: &Value) -> Option<String> {
  node["simpleText"]
    .as_str()
    .or_else(|| node["runs"][0]["text"].as_str())
    .map(String::from)
}
