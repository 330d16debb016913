use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::command::{CommandExecutor, SystemCommandExecutor};
use crate::config::ToolsSection;

use super::error::{AvError, AvResult};
use super::run_tool;
use super::types::{CompatibilityResult, VideoCodec, VideoContainer};

const TOOL: &str = "ffprobe";

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    #[serde(default)]
    disposition: Option<FfprobeDisposition>,
}

#[derive(Debug, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

impl FfprobeStream {
    fn is_primary_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
            && !self
                .disposition
                .as_ref()
                .map(|d| d.attached_pic == 1)
                .unwrap_or(false)
    }
}

/// Inspects media through `ffprobe` and maps the result onto the closed
/// codec/container allow-lists.
#[derive(Clone)]
pub struct MediaProbe {
    ffprobe: PathBuf,
    timeout: Duration,
    executor: Arc<dyn CommandExecutor>,
}

impl MediaProbe {
    pub fn new(tools: &ToolsSection) -> Self {
        Self {
            ffprobe: tools.ffprobe.clone(),
            timeout: tools.probe_timeout(),
            executor: Arc::new(SystemCommandExecutor),
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub async fn probe(&self, uri: &str) -> AvResult<CompatibilityResult> {
        let container = container_for_uri(uri)?;

        let mut command = Command::new(&self.ffprobe);
        command
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg(uri);
        let output = run_tool(
            self.executor.as_ref(),
            &mut command,
            TOOL,
            uri,
            Some(self.timeout),
        )
        .await?;

        let parsed: FfprobeOutput =
            serde_json::from_slice(&output.stdout).map_err(|err| AvError::SubprocessFailure {
                tool: TOOL.into(),
                subject: uri.to_string(),
                status: output.status.code(),
                stderr: format!("unreadable ffprobe output: {err}"),
            })?;
        let codec_name = parsed
            .streams
            .iter()
            .find(|stream| stream.is_primary_video())
            .and_then(|stream| stream.codec_name.clone())
            .ok_or_else(|| AvError::unsupported(uri, "no video stream found"))?;
        let codec: VideoCodec = codec_name
            .parse()
            .map_err(|reason: String| AvError::unsupported(uri, reason))?;

        debug!(uri, %codec, %container, "probed media");
        Ok(CompatibilityResult { codec, container })
    }

    /// Container duration in seconds as reported by `ffprobe`.
    pub async fn duration_seconds(&self, uri: &Path) -> AvResult<f64> {
        let subject = uri.display().to_string();
        let mut command = Command::new(&self.ffprobe);
        command
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(uri);
        let output = run_tool(
            self.executor.as_ref(),
            &mut command,
            TOOL,
            &subject,
            Some(self.timeout),
        )
        .await?;
        String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .next()
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or_else(|| AvError::SubprocessFailure {
                tool: TOOL.into(),
                subject,
                status: output.status.code(),
                stderr: "duration missing from ffprobe output".into(),
            })
    }
}

/// Derives the container from the URI's file extension. Query strings and
/// fragments of http(s)/file URLs are ignored.
pub fn container_for_uri(uri: &str) -> AvResult<VideoContainer> {
    let path = match Url::parse(uri) {
        Ok(url) if matches!(url.scheme(), "http" | "https" | "file") => url.path().to_string(),
        _ => uri.to_string(),
    };
    let extension = Path::new(&path)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .ok_or_else(|| AvError::unsupported(uri, "missing file extension"))?;
    VideoContainer::from_extension(&extension)
        .ok_or_else(|| AvError::unsupported(uri, format!("container {extension} is not supported")))
}
