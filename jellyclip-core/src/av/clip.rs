use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::assets::{describe_file, AssetError, AssetStore};
use crate::command::{CommandExecutor, SystemCommandExecutor};
use crate::config::{EncodeSection, ToolsSection};

use super::error::{AvError, AvResult};
use super::probe::MediaProbe;
use super::retime;
use super::run_tool;
use super::types::{ClipArtifact, ClipSpec, CompatibilityResult, VideoCodec, VideoContainer};

const TOOL: &str = "ffmpeg";

/// Cuts clips and thumbnails out of local media with `ffmpeg`.
#[derive(Clone)]
pub struct ClipProducer {
    ffmpeg: PathBuf,
    encode: EncodeSection,
    thumbnail_timeout: Duration,
    assets: AssetStore,
    probe: MediaProbe,
    executor: Arc<dyn CommandExecutor>,
}

impl ClipProducer {
    pub fn new(
        tools: &ToolsSection,
        encode: EncodeSection,
        assets: AssetStore,
        probe: MediaProbe,
    ) -> Self {
        Self {
            ffmpeg: tools.ffmpeg.clone(),
            encode,
            thumbnail_timeout: tools.thumbnail_timeout(),
            assets,
            probe,
            executor: Arc::new(SystemCommandExecutor),
        }
    }

    /// Replaces the executor used for both `ffmpeg` and the duration probe.
    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.probe = self.probe.with_executor(Arc::clone(&executor));
        self.executor = executor;
        self
    }

    /// Only h264 in mp4 plays directly in browsers; everything else the
    /// probe recognizes still has to be acquired and re-encoded.
    pub fn is_locally_usable(result: &CompatibilityResult) -> bool {
        result.codec == VideoCodec::H264 && result.container == VideoContainer::Mp4
    }

    pub fn default_thumbnail_percent(&self) -> f64 {
        self.encode.thumbnail_percent
    }

    pub async fn produce_clip(&self, spec: &ClipSpec) -> AvResult<ClipArtifact> {
        validate_range(spec)?;
        let output_path = self.assets.clip_video_path(&spec.clip_id)?;
        self.assets.ensure_directories().await?;
        let duration = spec.duration();

        let sidecar = match spec.subtitle_track.as_ref().filter(|t| t.has_content()) {
            Some(track) => {
                debug!(
                    clip_id = %spec.clip_id,
                    language = %track.language,
                    "burning subtitles into clip"
                );
                let shifted = retime::shift(&track.content, spec.start);
                Some(Sidecar {
                    path: self
                        .assets
                        .write_clip_subtitle(&spec.clip_id, &shifted)
                        .await?,
                })
            }
            None => None,
        };

        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(format_seconds(spec.start))
            .arg("-i")
            .arg(&spec.source_uri)
            .arg("-t")
            .arg(format_seconds(duration));
        if let Some(sidecar) = &sidecar {
            command.arg("-vf").arg(subtitles_filter(&sidecar.path));
        }
        command
            .arg("-c:v")
            .arg(&self.encode.video_codec)
            .arg("-pix_fmt")
            .arg(&self.encode.pixel_format)
            .arg("-crf")
            .arg(self.encode.crf.to_string())
            .arg("-preset")
            .arg(&self.encode.preset)
            .arg("-c:a")
            .arg(&self.encode.audio_codec)
            .arg("-movflags")
            .arg("+faststart")
            .arg(&output_path);

        let result = run_tool(
            self.executor.as_ref(),
            &mut command,
            TOOL,
            &spec.clip_id,
            None,
        )
        .await;

        let subtitles_burned = sidecar.is_some();
        drop(sidecar);
        if let Err(err) = result {
            self.assets.discard(&output_path).await;
            return Err(err);
        }

        info!(clip_id = %spec.clip_id, duration, "clip produced");
        Ok(ClipArtifact {
            clip_id: spec.clip_id.clone(),
            video_path: output_path,
            duration_seconds: duration,
            subtitles_burned,
        })
    }

    /// Extracts the audio track of an existing clip into `{clip_id}.mp3`
    /// beside it. An mp3 already on disk is returned without running ffmpeg.
    pub async fn produce_audio(&self, clip_id: &str) -> AvResult<PathBuf> {
        let clip_path = self.assets.clip_video_path(clip_id)?;
        let audio_path = self.assets.clip_audio_path(clip_id)?;
        match describe_file(&audio_path).await {
            Ok(_) => {
                debug!(clip_id, path = %audio_path.display(), "audio already extracted");
                return Ok(audio_path);
            }
            Err(AssetError::NotOnDisk { .. }) => {}
            Err(err) => return Err(err.into()),
        }
        describe_file(&clip_path).await?;

        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(&clip_path)
            .arg("-vn")
            .arg("-c:a")
            .arg(&self.encode.extract_audio_codec)
            .arg(&audio_path);
        if let Err(err) = run_tool(self.executor.as_ref(), &mut command, TOOL, clip_id, None).await
        {
            self.assets.discard(&audio_path).await;
            return Err(err);
        }

        info!(clip_id, path = %audio_path.display(), "audio extracted");
        Ok(audio_path)
    }

    /// Extracts one JPEG frame at `percent_offset` of the clip's duration and
    /// stores it beside the clip.
    pub async fn produce_thumbnail(&self, clip_id: &str, percent_offset: f64) -> AvResult<PathBuf> {
        if !percent_offset.is_finite() || !(0.0..=100.0).contains(&percent_offset) {
            return Err(AvError::InvalidThumbnailOffset {
                percent: percent_offset,
            });
        }
        let clip_path = self.assets.clip_video_path(clip_id)?;
        let thumbnail_path = self.assets.clip_thumbnail_path(clip_id)?;
        let duration = self.probe.duration_seconds(&clip_path).await?;
        let position = duration * percent_offset / 100.0;

        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(format_seconds(position))
            .arg("-i")
            .arg(&clip_path)
            .arg("-frames:v")
            .arg("1")
            .arg("-q:v")
            .arg("2")
            .arg(&thumbnail_path);
        run_tool(
            self.executor.as_ref(),
            &mut command,
            TOOL,
            clip_id,
            Some(self.thumbnail_timeout),
        )
        .await?;

        debug!(clip_id, path = %thumbnail_path.display(), "thumbnail generated");
        Ok(thumbnail_path)
    }
}

/// Subtitle side-car burned into one encode. Removed when dropped, so an
/// aborted encode leaves nothing behind either.
struct Sidecar {
    path: PathBuf,
}

impl Drop for Sidecar {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %self.path.display(), error = %err, "failed to remove subtitle side-car"),
        }
    }
}

fn validate_range(spec: &ClipSpec) -> AvResult<()> {
    let valid = spec.start.is_finite()
        && spec.end.is_finite()
        && spec.start >= 0.0
        && spec.end > spec.start;
    if valid {
        Ok(())
    } else {
        Err(AvError::InvalidClipRange {
            clip_id: spec.clip_id.clone(),
            start: spec.start,
            end: spec.end,
        })
    }
}

fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3}")
}

/// The `subtitles` filter takes a path inside a quoted filter argument.
fn subtitles_filter(path: &Path) -> String {
    let escaped = path
        .to_string_lossy()
        .replace('\\', "\\\\")
        .replace('\'', "'\\''");
    format!("subtitles='{escaped}'")
}
