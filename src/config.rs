use std::net::SocketAddr;

use crate::format::{AudioFormat, VideoFormat};

// placeholder consent cookies, enough to keep youtube from redirecting to
// the cookie wall. Real session cookies go in YOUTUBE_COOKIES_CONTENT.
const DEFAULT_COOKIES: &str = "\
# Netscape HTTP Cookie File\n\
# https://curl.haxx.se/rfc/cookie_spec.html\n\
# This is a generated file! Do not edit.\n\
\n\
.youtube.com\tTRUE\t/\tTRUE\t1803239253\tPREF\ttz=UTC&f7=100&f6=40000000\n\
.youtube.com\tTRUE\t/\tTRUE\t0\tYSC\tKSAvcaBsqpY\n\
.youtube.com\tTRUE\t/\tTRUE\t1784231249\tSOCS\tCAESEwgDEgk2NzM5OTg3MTIaAmVuIAEaBgiA0pS3Bg\n";

// Immutable process configuration, loaded from the environment once at
// startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
  pub listen_addr: SocketAddr,
  pub cookie_blob: String,
  pub profile: Profile,
}

impl Config {
  pub fn from_env() -> Self {
    let listen_addr = std::env::var("LISTEN_ADDR")
      .ok()
      .and_then(|s| s.parse().ok())
      .unwrap_or_else(|| "0.0.0.0:8080".parse().unwrap());

    let cookie_blob = std::env::var("YOUTUBE_COOKIES_CONTENT")
      .unwrap_or_else(|_| DEFAULT_COOKIES.to_string());

    let profile = std::env::var("PROFILE")
      .ok()
      .map(|s| Profile::from_name(&s))
      .unwrap_or(Profile::Broad);

    Self {
      listen_addr,
      cookie_blob,
      profile,
    }
  }
}

// Named filtering profiles. Broad surfaces everything yt-dlp reports as a
// direct file; narrow hides exotic bitrates and resolutions unlikely to be
// useful as download links. Formats outside the narrow bounds are hidden
// silently, with no indication that they exist. That is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
  Broad,
  Narrow,
}

impl Profile {
  pub fn from_name(name: &str) -> Self {
    match name.to_lowercase().as_str() {
      "narrow" | "lite" => Profile::Narrow,
      _ => Profile::Broad,
    }
  }

  pub fn policy(self) -> Policy {
    match self {
      Profile::Broad => Policy {
        min_audio_bitrate: 48.0,
        max_audio_bitrate: None,
        min_height: 1,
        max_height: None,
        labels: LabelScheme::Fine,
      },
      Profile::Narrow => Policy {
        min_audio_bitrate: 48.0,
        max_audio_bitrate: Some(512.0),
        min_height: 144,
        max_height: Some(1080),
        labels: LabelScheme::Coarse,
      },
    }
  }
}

// Pure keep/drop rules for classified formats. One struct instead of a
// fork of the whole pipeline per profile.
#[derive(Debug, Clone, Copy)]
pub struct Policy {
  pub min_audio_bitrate: f64,
  pub max_audio_bitrate: Option<f64>,
  pub min_height: u32,
  pub max_height: Option<u32>,
  pub labels: LabelScheme,
}

impl Policy {
  pub fn admits_audio(&self, audio: &AudioFormat) -> bool {
    let abr = audio.bitrate.unwrap_or(0) as f64;
    abr >= self.min_audio_bitrate
      && self.max_audio_bitrate.map_or(true, |max| abr <= max)
  }

  pub fn admits_video(&self, video: &VideoFormat) -> bool {
    video.height >= self.min_height
      && self.max_height.map_or(true, |max| video.height <= max)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScheme {
  // High >= 160kbps, Medium >= 128kbps, else Low
  Fine,
  // Highest >= 256kbps, Medium >= 128kbps, else Low, plus a container tag
  Coarse,
}

impl LabelScheme {
  pub fn audio_label(self, abr: f64) -> &'static str {
    match self {
      LabelScheme::Fine if abr >= 160.0 => "High",
      LabelScheme::Coarse if abr >= 256.0 => "Highest",
      _ if abr >= 128.0 => "Medium",
      _ => "Low",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn profile_names() {
    assert_eq!(Profile::from_name("narrow"), Profile::Narrow);
    assert_eq!(Profile::from_name("Lite"), Profile::Narrow);
    assert_eq!(Profile::from_name("broad"), Profile::Broad);
    assert_eq!(Profile::from_name("anything else"), Profile::Broad);
  }

  #[test]
  fn label_thresholds() {
    assert_eq!(LabelScheme::Fine.audio_label(170.0), "High");
    assert_eq!(LabelScheme::Fine.audio_label(130.0), "Medium");
    assert_eq!(LabelScheme::Fine.audio_label(50.0), "Low");

    assert_eq!(LabelScheme::Coarse.audio_label(256.0), "Highest");
    assert_eq!(LabelScheme::Coarse.audio_label(170.0), "Medium");
    assert_eq!(LabelScheme::Coarse.audio_label(64.0), "Low");
  }
}
