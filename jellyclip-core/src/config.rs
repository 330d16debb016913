use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ClipperConfig {
    pub paths: PathsSection,
    pub tools: ToolsSection,
    pub download: DownloadSection,
    pub encode: EncodeSection,
    pub progress: ProgressSection,
    pub tasks: TasksSection,
}

impl ClipperConfig {
    pub fn validate(&self) -> Result<()> {
        if self.progress.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "progress.channel_capacity",
                reason: "must be greater than zero".into(),
            });
        }
        if self.encode.thumbnail_percent > 100.0 || self.encode.thumbnail_percent < 0.0 {
            return Err(ConfigError::Invalid {
                field: "encode.thumbnail_percent",
                reason: format!("{} is outside 0..=100", self.encode.thumbnail_percent),
            });
        }
        if self.encode.preset.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "encode.preset",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub asset_root: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub probe_timeout_seconds: u64,
    pub thumbnail_timeout_seconds: u64,
}

impl ToolsSection {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn thumbnail_timeout(&self) -> Duration {
        Duration::from_secs(self.thumbnail_timeout_seconds)
    }
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            probe_timeout_seconds: 30,
            thumbnail_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSection {
    pub user_agent: String,
    pub connect_timeout_seconds: u64,
    /// Minimum wall-clock gap between two intermediate progress events.
    pub progress_interval_ms: u64,
    /// Accepted absolute difference between an on-disk original and the
    /// size reported by the catalog.
    pub size_tolerance_bytes: u64,
}

impl DownloadSection {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            user_agent: "JellyClip/1.0".into(),
            connect_timeout_seconds: 30,
            progress_interval_ms: 500,
            size_tolerance_bytes: 100 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EncodeSection {
    pub video_codec: String,
    pub crf: u8,
    pub preset: String,
    pub pixel_format: String,
    pub audio_codec: String,
    /// Encoder for the standalone mp3 extracted from a clip.
    pub extract_audio_codec: String,
    pub thumbnail_percent: f64,
}

impl Default for EncodeSection {
    fn default() -> Self {
        Self {
            video_codec: "libx264".into(),
            crf: 23,
            preset: "medium".into(),
            pixel_format: "yuv420p".into(),
            audio_codec: "aac".into(),
            extract_audio_codec: "libmp3lame".into(),
            thumbnail_percent: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressSection {
    pub channel_capacity: usize,
}

impl Default for ProgressSection {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TasksSection {
    /// How long a completed or failed task stays retrievable.
    pub finished_retention_seconds: u64,
}

impl TasksSection {
    pub fn finished_retention(&self) -> Duration {
        Duration::from_secs(self.finished_retention_seconds)
    }
}

impl Default for TasksSection {
    fn default() -> Self {
        Self {
            finished_retention_seconds: 3600,
        }
    }
}

pub fn load_clipper_config<P: AsRef<Path>>(path: P) -> Result<ClipperConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    let config: ClipperConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        source,
        path: path.to_path_buf(),
    })?;
    config.validate()?;
    Ok(config)
}
