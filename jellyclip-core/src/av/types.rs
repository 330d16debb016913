use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    Hevc,
    Vp9,
    Av1,
}

impl VideoCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::Hevc => "hevc",
            VideoCodec::Vp9 => "vp9",
            VideoCodec::Av1 => "av1",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h264" => Ok(Self::H264),
            "hevc" => Ok(Self::Hevc),
            "vp9" => Ok(Self::Vp9),
            "av1" => Ok(Self::Av1),
            other => Err(format!("video codec {other} is not supported")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoContainer {
    Mp4,
    Mkv,
    Webm,
    Mov,
}

impl VideoContainer {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "mp4",
            VideoContainer::Mkv => "mkv",
            VideoContainer::Webm => "webm",
            VideoContainer::Mov => "mov",
        }
    }

    /// Containers are identified by file extension only, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp4" => Some(Self::Mp4),
            "mkv" => Some(Self::Mkv),
            "webm" => Some(Self::Webm),
            "mov" => Some(Self::Mov),
            _ => None,
        }
    }
}

impl fmt::Display for VideoContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompatibilityResult {
    pub codec: VideoCodec,
    pub container: VideoContainer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTrack {
    /// Full SRT document.
    pub content: String,
    pub language: String,
    pub title: String,
}

impl SubtitleTrack {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSpec {
    pub clip_id: String,
    pub source_uri: String,
    /// Seconds from the start of the source.
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub subtitle_track: Option<SubtitleTrack>,
}

impl ClipSpec {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipArtifact {
    pub clip_id: String,
    pub video_path: PathBuf,
    pub duration_seconds: f64,
    pub subtitles_burned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_parsing_is_closed() {
        assert_eq!("hevc".parse::<VideoCodec>(), Ok(VideoCodec::Hevc));
        assert!("mpeg2video".parse::<VideoCodec>().is_err());
        assert!("H264".parse::<VideoCodec>().is_err());
    }

    #[test]
    fn container_extension_is_case_insensitive() {
        assert_eq!(VideoContainer::from_extension("MKV"), Some(VideoContainer::Mkv));
        assert_eq!(VideoContainer::from_extension("avi"), None);
    }

    #[test]
    fn clip_spec_reads_camel_case_json() {
        let spec: ClipSpec = serde_json::from_str(
            r#"{"clipId":"7","sourceUri":"/a.mp4","start":1.5,"end":4.0}"#,
        )
        .unwrap();
        assert_eq!(spec.clip_id, "7");
        assert_eq!(spec.duration(), 2.5);
        assert!(spec.subtitle_track.is_none());
    }
}
