use std::time::Duration;

use thiserror::Error;

use crate::assets::AssetError;

#[derive(Debug, Error)]
pub enum AvError {
    #[error("unsupported format for {uri}: {reason}")]
    UnsupportedFormat { uri: String, reason: String },
    #[error("invalid clip range for {clip_id}: end {end}s must be after start {start}s")]
    InvalidClipRange {
        clip_id: String,
        start: f64,
        end: f64,
    },
    #[error("thumbnail offset {percent}% is outside 0..=100")]
    InvalidThumbnailOffset { percent: f64 },
    #[error("{tool} failed for {subject} (status {status:?}): {stderr}")]
    SubprocessFailure {
        tool: String,
        subject: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("{tool} timed out after {timeout:?} for {subject}")]
    Timeout {
        tool: String,
        subject: String,
        timeout: Duration,
    },
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

impl AvError {
    pub(crate) fn unsupported(uri: &str, reason: impl Into<String>) -> Self {
        AvError::UnsupportedFormat {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

pub type AvResult<T> = Result<T, AvError>;
