mod clip;
mod error;
mod probe;
pub mod retime;
mod types;

use std::process::Output;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::command::{describe, CommandExecutor};

pub use clip::ClipProducer;
pub use error::{AvError, AvResult};
pub use probe::{container_for_uri, MediaProbe};
pub use types::{
    ClipArtifact, ClipSpec, CompatibilityResult, SubtitleTrack, VideoCodec, VideoContainer,
};

/// Runs a media tool to completion. Spawn errors, non-zero exits and
/// signals all surface as [`AvError::SubprocessFailure`].
pub(crate) async fn run_tool(
    executor: &dyn CommandExecutor,
    command: &mut Command,
    tool: &str,
    subject: &str,
    limit: Option<Duration>,
) -> AvResult<Output> {
    debug!(command = %describe(command), "running media tool");
    let execution = executor.run(command);
    let result = match limit {
        Some(limit) => timeout(limit, execution)
            .await
            .map_err(|_| AvError::Timeout {
                tool: tool.to_string(),
                subject: subject.to_string(),
                timeout: limit,
            })?,
        None => execution.await,
    };
    let output = result.map_err(|err| AvError::SubprocessFailure {
        tool: tool.to_string(),
        subject: subject.to_string(),
        status: None,
        stderr: err.to_string(),
    })?;
    if !output.status.success() {
        return Err(AvError::SubprocessFailure {
            tool: tool.to_string(),
            subject: subject.to_string(),
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}
