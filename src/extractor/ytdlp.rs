use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::Config;
use crate::{Error, Result};

use super::{Extractor, FormatSelector, MediaInfo, Target};

const USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const REFERER: &str = "https://www.youtube.com/";
const SOCKET_TIMEOUT_SECS: u32 = 30;
const RETRIES: u32 = 3;

// ensure only a limited set of yt-dlp processes at a time
static YTDLP_MUTEX: LazyLock<Semaphore> = LazyLock::new(|| {
  let concurrency = std::env::var("YTDLP_CONCURRENCY")
    .ok()
    .and_then(|s| s.parse::<usize>().ok())
    .unwrap_or(4);
  Semaphore::new(concurrency)
});

// run the yt-dlp command line to get video metadata and format descriptors.
// requires the yt-dlp executable to be in PATH.
pub struct Ytdlp {
  cookie_file: PathBuf,
}

impl Ytdlp {
  // materializes the in-memory cookie credential to a private file once,
  // since yt-dlp only accepts cookies by path
  pub fn new(config: &Config) -> Result<Self> {
    let cookie_file =
      std::env::temp_dir().join("youtube-link-api-cookies.txt");
    std::fs::write(&cookie_file, &config.cookie_blob)?;

    Ok(Self { cookie_file })
  }
}

#[async_trait]
impl Extractor for Ytdlp {
  async fn extract(
    &self,
    target: &Target,
    selector: &FormatSelector,
  ) -> Result<MediaInfo> {
    let args = build_args(&self.cookie_file, target, selector);
    debug!("running yt-dlp for {:?}", target);

    let guard = YTDLP_MUTEX.acquire().await.unwrap();
    let output = Command::new("yt-dlp")
      .args(&args)
      .output()
      .await
      .map_err(|e| Error::Extraction(format!("failed to run yt-dlp: {e}")))?;
    drop(guard);

    if let Some(error) = detect_error(&output.stderr) {
      warn!("yt-dlp failed for {:?}: {}", target, error);
      return Err(Error::Extraction(error));
    }

    let document: Document = serde_json::from_slice(&output.stdout)
      .map_err(|e| Error::Extraction(format!("unreadable yt-dlp output: {e}")))?;

    document.into_media_info()
  }
}

pub(super) fn build_args(
  cookie_file: &Path,
  target: &Target,
  selector: &FormatSelector,
) -> Vec<String> {
  let mut args: Vec<String> = [
    "-J",
    "--no-warnings",
    "--no-check-certificates",
    "--no-color",
    "--user-agent",
    USER_AGENT,
    "--referer",
    REFERER,
    "--add-header",
    "Accept-Language:en-US,en;q=0.9",
    "--add-header",
    "Origin:https://www.youtube.com",
  ]
  .map(String::from)
  .to_vec();

  args.push("--cookies".to_string());
  args.push(cookie_file.display().to_string());
  args.push("--socket-timeout".to_string());
  args.push(SOCKET_TIMEOUT_SECS.to_string());
  args.push("--retries".to_string());
  args.push(RETRIES.to_string());
  args.push("-f".to_string());
  args.push(selector.as_arg());
  args.push(target.as_arg());

  args
}

// yt-dlp writes one "ERROR: ..." line to stderr per failed extraction
fn detect_error(stderr: &[u8]) -> Option<String> {
  String::from_utf8_lossy(stderr)
    .lines()
    .find(|line| line.contains("ERROR:"))
    .map(|line| line.trim().to_string())
}

// `-J` on a watch url emits the video object directly; on a ytsearch
// pseudo-url it emits a playlist wrapper whose entries hold the videos.
#[derive(Deserialize)]
pub(super) struct Document {
  entries: Option<Vec<MediaInfo>>,
  #[serde(flatten)]
  info: MediaInfo,
}

impl Document {
  pub(super) fn into_media_info(self) -> Result<MediaInfo> {
    match self.entries {
      Some(entries) => {
        entries.into_iter().next().ok_or(Error::NoSearchResult)
      }
      None => Ok(self.info),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn args_carry_cookies_timeouts_and_selector() {
    let target = Target::Url("https://youtu.be/abc".to_string());
    let selector = FormatSelector::Merged {
      max_height: Some(720),
    };
    let args =
      build_args(Path::new("/tmp/cookies.txt"), &target, &selector);

    let joined = args.join(" ");
    assert!(joined.contains("--cookies /tmp/cookies.txt"));
    assert!(joined.contains("--socket-timeout 30"));
    assert!(joined.contains("--retries 3"));
    assert!(joined.contains(
      "-f bestvideo[height<=720]+bestaudio/best[height<=720]/best"
    ));
    assert_eq!(args.last().unwrap(), "https://youtu.be/abc");
  }

  #[test]
  fn query_target_is_wrapped_as_ytsearch() {
    let target = Target::Query("lofi beats".to_string());
    let args =
      build_args(Path::new("/tmp/cookies.txt"), &target, &FormatSelector::All);
    assert_eq!(args.last().unwrap(), "ytsearch1:lofi beats");
  }

  #[test]
  fn playlist_document_unwraps_first_entry() {
    let json = r#"{
      "title": "lofi beats",
      "entries": [
        { "title": "first", "formats": [] },
        { "title": "second", "formats": [] }
      ]
    }"#;
    let document: Document = serde_json::from_str(json).unwrap();
    let info = document.into_media_info().unwrap();
    assert_eq!(info.title.as_deref(), Some("first"));
  }

  #[test]
  fn empty_search_playlist_is_no_result() {
    let json = r#"{ "title": "gibberish", "entries": [] }"#;
    let document: Document = serde_json::from_str(json).unwrap();
    assert!(matches!(
      document.into_media_info(),
      Err(Error::NoSearchResult)
    ));
  }

  #[test]
  fn stderr_error_line_is_detected() {
    let stderr = b"WARNING: something benign\nERROR: Video unavailable\n";
    assert_eq!(
      detect_error(stderr),
      Some("ERROR: Video unavailable".to_string())
    );
    assert_eq!(detect_error(b"all quiet"), None);
  }
}
