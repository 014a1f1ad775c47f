use serde::{Deserialize, Serialize};

use crate::config::{LabelScheme, Policy};

// One candidate stream as reported by yt-dlp's json output. Everything is
// optional because extractors for different sites fill in different subsets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFormat {
  pub format_id: Option<String>,
  pub url: Option<String>,
  pub ext: Option<String>,
  pub vcodec: Option<String>,
  pub acodec: Option<String>,
  pub height: Option<u32>,
  pub width: Option<u32>,
  pub resolution: Option<String>,
  pub fps: Option<f64>,
  pub abr: Option<f64>,
  pub vbr: Option<f64>,
  pub tbr: Option<f64>,
  pub filesize: Option<f64>,
  pub filesize_approx: Option<f64>,
  pub protocol: Option<String>,
}

impl RawFormat {
  pub fn filesize(&self) -> Option<u64> {
    self.filesize.or(self.filesize_approx).map(|n| n as u64)
  }

  fn abr(&self) -> f64 {
    self.abr.unwrap_or(0.0)
  }

  // width x height from the free-form resolution string, e.g. "1280x720"
  fn height_from_resolution(&self) -> Option<u32> {
    let res = self.resolution.as_deref()?;
    let (_, h) = res.split_once('x')?;
    h.trim().parse().ok()
  }

  fn effective_height(&self) -> u32 {
    self
      .height
      .filter(|h| *h > 0)
      .or_else(|| self.height_from_resolution())
      .unwrap_or(0)
  }
}

// an absent codec field means the same thing as yt-dlp's literal "none"
fn codec_present(codec: &Option<String>) -> bool {
  !matches!(codec.as_deref(), None | Some("none") | Some(""))
}

const MANIFEST_MARKERS: [&str; 3] = ["manifest", "m3u8", "mpd"];

#[derive(Debug, Clone, Serialize)]
pub struct AudioFormat {
  pub format_id: String,
  pub ext: String,
  pub filesize: Option<u64>,
  pub url: String,
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub quality: String,
  pub quality_label: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format: Option<&'static str>,
  pub codec: String,
  pub bitrate: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoFormat {
  pub format_id: String,
  pub ext: String,
  pub filesize: Option<u64>,
  pub url: String,
  #[serde(rename = "type")]
  pub kind: &'static str,
  pub quality: String,
  pub resolution: String,
  pub fps: Option<f64>,
  pub vcodec: String,
  pub acodec: Option<String>,
  pub has_audio: bool,
  pub tbr: Option<u64>,
  #[serde(skip)]
  pub height: u32,
}

#[derive(Debug)]
pub enum Classified {
  Audio(AudioFormat),
  Video(VideoFormat),
  Discarded(&'static str),
}

// Decide whether one raw descriptor is a usable audio stream, a usable
// video stream, or nothing we can hand out as a direct download link.
pub fn classify(raw: &RawFormat, labels: LabelScheme) -> Classified {
  let url = match raw.url.as_deref() {
    Some(url) if !url.is_empty() => url,
    _ => return Classified::Discarded("no url"),
  };

  let lowered = url.to_lowercase();
  if MANIFEST_MARKERS.iter().any(|m| lowered.contains(m)) {
    return Classified::Discarded("streaming manifest, not a direct file");
  }

  let has_video = codec_present(&raw.vcodec);
  let has_audio = codec_present(&raw.acodec);

  if !has_video && has_audio {
    return Classified::Audio(audio_format(raw, url, labels));
  }

  if has_video {
    let height = raw.effective_height();
    if height == 0 && raw.resolution.as_deref().unwrap_or("").is_empty() {
      return Classified::Discarded("no playable stream");
    }
    return Classified::Video(video_format(raw, url, height));
  }

  Classified::Discarded("no playable stream")
}

fn audio_format(
  raw: &RawFormat,
  url: &str,
  labels: LabelScheme,
) -> AudioFormat {
  let abr = raw.abr();
  let ext = raw.ext.clone().unwrap_or_else(|| "mp4".to_string());
  let format = match labels {
    LabelScheme::Fine => None,
    LabelScheme::Coarse => Some(audio_format_tag(&ext, &raw.acodec)),
  };

  AudioFormat {
    format_id: raw.format_id.clone().unwrap_or_default(),
    filesize: raw.filesize(),
    url: url.to_string(),
    kind: "audio",
    quality: if abr > 0.0 {
      format!("{}kbps", abr as u64)
    } else {
      "Unknown".to_string()
    },
    quality_label: labels.audio_label(abr),
    format,
    codec: raw.acodec.clone().unwrap_or_default(),
    bitrate: (abr > 0.0).then_some(abr as u64),
    ext,
  }
}

// short container tag used by the coarse labeling scheme. This is a display
// label, the underlying stream keeps its real codec.
fn audio_format_tag(ext: &str, acodec: &Option<String>) -> &'static str {
  if ext.contains("mp4") || ext.contains("m4a") {
    "mpa"
  } else if acodec.as_deref().unwrap_or("").contains("opus") {
    "opus"
  } else {
    "mp3"
  }
}

fn video_format(raw: &RawFormat, url: &str, height: u32) -> VideoFormat {
  let resolution = match raw.width {
    Some(w) if w > 0 => format!("{}x{}", w, height),
    _ => format!("{}p", height),
  };
  let has_audio = codec_present(&raw.acodec);

  VideoFormat {
    format_id: raw.format_id.clone().unwrap_or_default(),
    ext: raw.ext.clone().unwrap_or_else(|| "mp4".to_string()),
    filesize: raw.filesize(),
    url: url.to_string(),
    kind: "video",
    quality: format!("{}p", height),
    resolution,
    fps: raw.fps,
    vcodec: raw.vcodec.clone().unwrap_or_default(),
    acodec: has_audio.then(|| raw.acodec.clone().unwrap_or_default()),
    has_audio,
    tbr: raw.tbr.filter(|t| *t > 0.0).map(|t| t as u64),
    height,
  }
}

// The two response buckets, each sorted best-first. Duplicate format_ids
// coming from the source are passed through as-is.
#[derive(Debug, Default, Serialize)]
pub struct FormatBucket {
  pub audio: Vec<AudioFormat>,
  pub video: Vec<VideoFormat>,
}

impl FormatBucket {
  pub fn collect(raws: &[RawFormat], policy: &Policy) -> Self {
    let mut bucket = FormatBucket::default();

    for raw in raws {
      match classify(raw, policy.labels) {
        Classified::Audio(audio) if policy.admits_audio(&audio) => {
          bucket.audio.push(audio)
        }
        Classified::Video(video) if policy.admits_video(&video) => {
          bucket.video.push(video)
        }
        _ => {}
      }
    }

    // stable sorts: equal-quality entries keep their source order
    bucket
      .audio
      .sort_by(|a, b| b.bitrate.unwrap_or(0).cmp(&a.bitrate.unwrap_or(0)));
    bucket.video.sort_by(|a, b| b.height.cmp(&a.height));

    bucket
  }

  // drop video entries above the caller's requested height
  pub fn cap_video_height(&mut self, max_height: u32) {
    self.video.retain(|v| v.height <= max_height);
  }
}
