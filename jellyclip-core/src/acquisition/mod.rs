mod error;
mod resolver;
mod types;

use std::ffi::OsString;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::Client;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::assets::{describe_file, AssetStore, FileDescriptor};
use crate::config::DownloadSection;
use crate::progress::{ProgressBus, ProgressEvent};
use crate::tasks::{TaskHandle, TaskRegistry};

pub use error::{AcquireError, AcquireResult, CatalogError};
pub use resolver::{DownloadUrlResolver, ResolvedDownload, StaticUrlResolver};
pub use types::{CatalogItem, MediaSourceDescriptor, MediaStream, StreamSelection, StreamType};

use error::transport;

const FILE_CHUNK_BYTES: usize = 64 * 1024;

/// Makes sure an item's original exists under `originals/`, reusing a file
/// already on disk or streaming it from the catalog server.
#[derive(Debug, Clone)]
pub struct MediaAcquisitionService {
    assets: AssetStore,
    bus: ProgressBus,
    http: Client,
    progress_interval: Duration,
    size_tolerance_bytes: u64,
}

impl MediaAcquisitionService {
    pub fn new(settings: &DownloadSection, assets: AssetStore, bus: ProgressBus) -> AcquireResult<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .connect_timeout(settings.connect_timeout())
            .build()
            .map_err(|err| AcquireError::Client(err.to_string()))?;
        Ok(Self {
            assets,
            bus,
            http,
            progress_interval: settings.progress_interval(),
            size_tolerance_bytes: settings.size_tolerance_bytes,
        })
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn bus(&self) -> &ProgressBus {
        &self.bus
    }

    pub async fn acquire(
        &self,
        item_id: &str,
        descriptor: &MediaSourceDescriptor,
        selection: StreamSelection,
        resolver: &dyn DownloadUrlResolver,
    ) -> AcquireResult<FileDescriptor> {
        selection.validate(item_id, descriptor)?;
        if let Some(existing) = self.reusable_original(item_id, descriptor.size_bytes).await? {
            info!(item_id, size_bytes = existing.size_bytes, "reusing original already on disk");
            return Ok(existing);
        }

        let resolved = resolver.resolve(item_id, descriptor, selection).await?;
        debug!(item_id, session_id = ?resolved.session_id, "download url resolved");

        self.assets.ensure_directories().await?;
        let target = self.assets.original_path(item_id)?;
        self.download(item_id, &resolved.url, &target, descriptor.size_bytes)
            .await?;

        let written = describe_file(&target).await?;
        info!(item_id, size_bytes = written.size_bytes, "original acquired");
        Ok(written)
    }

    /// Runs [`MediaAcquisitionService::acquire`] as a registry task keyed by
    /// the item id. A live acquisition of the same item is returned instead.
    pub fn start(
        &self,
        registry: &TaskRegistry<FileDescriptor>,
        item_id: &str,
        descriptor: MediaSourceDescriptor,
        selection: StreamSelection,
        resolver: Arc<dyn DownloadUrlResolver>,
    ) -> TaskHandle<FileDescriptor> {
        let service = self.clone();
        let key = item_id.to_string();
        registry.start(item_id, async move {
            service
                .acquire(&key, &descriptor, selection, resolver.as_ref())
                .await
        })
    }

    async fn reusable_original(
        &self,
        item_id: &str,
        expected_bytes: u64,
    ) -> AcquireResult<Option<FileDescriptor>> {
        let Some(existing) = self.assets.original_info(item_id).await? else {
            return Ok(None);
        };
        if within_tolerance(existing.size_bytes, expected_bytes, self.size_tolerance_bytes) {
            return Ok(Some(existing));
        }
        warn!(
            item_id,
            on_disk = existing.size_bytes,
            expected = expected_bytes,
            "original on disk has unexpected size, downloading again"
        );
        Ok(None)
    }

    async fn download(
        &self,
        item_id: &str,
        url: &str,
        target: &Path,
        total_size_bytes: u64,
    ) -> AcquireResult<()> {
        let part = PartFile::new(target);
        let file = fs::File::create(part.path())
            .await
            .map_err(|source| AcquireError::Io {
                path: part.path().to_path_buf(),
                source,
            })?;

        self.bus.publish(ProgressEvent::new(item_id, 0, total_size_bytes));

        let sink = ChunkSink {
            item_id,
            path: part.path(),
            file,
            bus: &self.bus,
            total_size_bytes,
            interval: self.progress_interval,
        };
        let downloaded = match file_url_path(url) {
            Some(source) => {
                let file = fs::File::open(&source)
                    .await
                    .map_err(|err| transport(item_id, format!("{}: {err}", source.display())))?;
                sink.drain(file_chunks(file)).await?
            }
            None => {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map_err(|err| transport(item_id, err))?;
                sink.drain(response.bytes_stream()).await?
            }
        };

        fs::rename(part.path(), target)
            .await
            .map_err(|source| AcquireError::Io {
                path: target.to_path_buf(),
                source,
            })?;
        part.keep();

        self.bus.publish(ProgressEvent::completed(item_id, downloaded, total_size_bytes));
        Ok(())
    }
}

pub fn within_tolerance(actual_bytes: u64, expected_bytes: u64, tolerance_bytes: u64) -> bool {
    actual_bytes.abs_diff(expected_bytes) <= tolerance_bytes
}

struct ChunkSink<'a> {
    item_id: &'a str,
    path: &'a Path,
    file: fs::File,
    bus: &'a ProgressBus,
    total_size_bytes: u64,
    interval: Duration,
}

impl ChunkSink<'_> {
    /// Writes every chunk to disk and returns the byte count. Progress is
    /// published at most once per interval.
    async fn drain<S, B, E>(mut self, chunks: S) -> AcquireResult<u64>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        tokio::pin!(chunks);
        let mut downloaded = 0u64;
        let mut last_emit = Instant::now();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|err| transport(self.item_id, err))?;
            let bytes = chunk.as_ref();
            self.file
                .write_all(bytes)
                .await
                .map_err(|source| self.io_error(source))?;
            downloaded += bytes.len() as u64;
            if last_emit.elapsed() >= self.interval {
                last_emit = Instant::now();
                debug!(item_id = self.item_id, bytes = downloaded, "download progress");
                self.bus.publish(ProgressEvent::new(
                    self.item_id,
                    downloaded,
                    self.total_size_bytes,
                ));
            }
        }
        self.file.flush().await.map_err(|source| self.io_error(source))?;
        Ok(downloaded)
    }

    fn io_error(&self, source: io::Error) -> AcquireError {
        AcquireError::Io {
            path: self.path.to_path_buf(),
            source,
        }
    }
}

/// `<target>.part`, deleted on drop unless kept. Dropping covers failure
/// and task cancellation alike.
struct PartFile {
    path: PathBuf,
    keep: bool,
}

impl PartFile {
    fn new(target: &Path) -> Self {
        let mut name = OsString::from(target.as_os_str());
        name.push(".part");
        Self {
            path: PathBuf::from(name),
            keep: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed partial download"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %self.path.display(), error = %err, "failed to remove partial download"),
        }
    }
}

fn file_url_path(url: &str) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    if parsed.scheme() != "file" {
        return None;
    }
    parsed.to_file_path().ok()
}

fn file_chunks(file: fs::File) -> impl Stream<Item = io::Result<Vec<u8>>> {
    futures::stream::try_unfold(file, |mut file| async move {
        let mut buffer = vec![0u8; FILE_CHUNK_BYTES];
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            return Ok(None);
        }
        buffer.truncate(read);
        Ok::<_, io::Error>(Some((buffer, file)))
    })
}
