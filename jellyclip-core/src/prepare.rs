use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::acquisition::{
    AcquireError, CatalogError, CatalogItem, DownloadUrlResolver, MediaAcquisitionService,
    StreamSelection,
};
use crate::assets::{describe_file, AssetError, AssetStore, FileDescriptor};
use crate::av::{AvError, ClipProducer, CompatibilityResult, MediaProbe, VideoContainer};
use crate::tasks::{TaskHandle, TaskRegistry};

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Av(#[from] AvError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Acquire(#[from] AcquireError),
}

pub type PrepareResult<T> = Result<T, PrepareError>;

/// How the original of an item becomes available for clipping.
#[derive(Debug)]
pub enum Preparation {
    /// The stream can be trimmed in the browser as served.
    DirectPlay {
        uri: String,
        compatibility: CompatibilityResult,
    },
    /// The media server's own file was linked into `originals/`.
    Linked(FileDescriptor),
    /// A download is running, or was already running, in the registry.
    Acquiring(TaskHandle<FileDescriptor>),
}

/// Picks between direct play, a local link and a background download.
#[derive(Clone)]
pub struct ClipPreparer {
    probe: MediaProbe,
    assets: AssetStore,
    acquisition: MediaAcquisitionService,
    registry: TaskRegistry<FileDescriptor>,
}

impl ClipPreparer {
    pub fn new(
        probe: MediaProbe,
        assets: AssetStore,
        acquisition: MediaAcquisitionService,
        registry: TaskRegistry<FileDescriptor>,
    ) -> Self {
        Self {
            probe,
            assets,
            acquisition,
            registry,
        }
    }

    pub async fn prepare(
        &self,
        item: &CatalogItem,
        stream_uri: &str,
        selection: StreamSelection,
        resolver: Arc<dyn DownloadUrlResolver>,
    ) -> PrepareResult<Preparation> {
        let source = item.primary_source()?;
        selection.validate(&item.id, source)?;
        let compatibility = self.probe.probe(stream_uri).await?;
        if ClipProducer::is_locally_usable(&compatibility) {
            debug!(item_id = %item.id, "source is directly playable");
            return Ok(Preparation::DirectPlay {
                uri: stream_uri.to_string(),
                compatibility,
            });
        }

        if let Some(local) = source.path.as_deref() {
            if is_linkable(local).await {
                self.assets.ensure_directories().await?;
                let linked = self.assets.link_original(&item.id, local).await?;
                let descriptor = describe_file(&linked).await?;
                info!(item_id = %item.id, path = %local.display(), "using media server file");
                return Ok(Preparation::Linked(descriptor));
            }
        }

        let handle = self
            .acquisition
            .start(&self.registry, &item.id, source.clone(), selection, resolver);
        Ok(Preparation::Acquiring(handle))
    }
}

async fn is_linkable(path: &Path) -> bool {
    let is_mp4 = path
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(VideoContainer::from_extension)
        == Some(VideoContainer::Mp4);
    is_mp4
        && fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
}
