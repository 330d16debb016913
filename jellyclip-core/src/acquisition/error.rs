use std::path::PathBuf;

use thiserror::Error;

use crate::assets::AssetError;

use super::types::StreamType;

/// Failures reported by the catalog collaborator, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("no media source found for item {item_id}")]
    NotFound { item_id: String },
    #[error("item {item_id} has {count} media sources, expected exactly one")]
    MultipleSources { item_id: String, count: usize },
    #[error("no audio streams found for item {item_id}")]
    NoAudioStreams { item_id: String },
    #[error("item {item_id} has no {expected:?} stream at index {index}")]
    InvalidStreamSelection {
        item_id: String,
        index: u32,
        expected: StreamType,
    },
    #[error("catalog server is not configured")]
    NotConfigured,
    #[error("catalog api error: {0}")]
    Api(String),
}

#[derive(Debug, Error)]
pub enum AcquireError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("transport failure for item {item_id}: {message}")]
    Transport { item_id: String, message: String },
    #[error("http client setup failed: {0}")]
    Client(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("io error at {path}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

pub type AcquireResult<T> = Result<T, AcquireError>;

pub(crate) fn transport(item_id: &str, message: impl ToString) -> AcquireError {
    AcquireError::Transport {
        item_id: item_id.to_string(),
        message: message.to_string(),
    }
}
