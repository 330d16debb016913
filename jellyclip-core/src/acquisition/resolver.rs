use async_trait::async_trait;
use url::Url;

use super::error::CatalogError;
use super::types::{MediaSourceDescriptor, StreamSelection};

/// A time-limited URL the original can be streamed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    pub url: String,
    /// Playback session opened upstream to authorize the download, if any.
    pub session_id: Option<String>,
}

/// Turns an item into a download URL. Implemented by the catalog client,
/// which may need to negotiate a playback session first. The selection has
/// already been checked against `source`.
#[async_trait]
pub trait DownloadUrlResolver: Send + Sync {
    async fn resolve(
        &self,
        item_id: &str,
        source: &MediaSourceDescriptor,
        selection: StreamSelection,
    ) -> Result<ResolvedDownload, CatalogError>;
}

/// Always resolves to one configured URL. For http(s) URLs the stream
/// selection is passed along as query parameters.
#[derive(Debug, Clone)]
pub struct StaticUrlResolver {
    url: String,
}

impl StaticUrlResolver {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl DownloadUrlResolver for StaticUrlResolver {
    async fn resolve(
        &self,
        _item_id: &str,
        _source: &MediaSourceDescriptor,
        selection: StreamSelection,
    ) -> Result<ResolvedDownload, CatalogError> {
        let url = match Url::parse(&self.url) {
            Ok(mut url) if !selection.is_empty() && matches!(url.scheme(), "http" | "https") => {
                selection.append_to(&mut url);
                url.into()
            }
            _ => self.url.clone(),
        };
        Ok(ResolvedDownload {
            url,
            session_id: None,
        })
    }
}
