use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

pub const ORIGINAL_EXTENSION: &str = "mp4";
pub const CLIP_EXTENSION: &str = "mp4";
pub const THUMBNAIL_EXTENSION: &str = "jpg";
pub const SUBTITLE_EXTENSION: &str = "srt";
pub const AUDIO_EXTENSION: &str = "mp3";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset id {id:?}")]
    InvalidId { id: String },
    #[error("asset not on disk: {path}")]
    NotOnDisk { path: PathBuf },
    #[error("io error at {path}: {source}")]
    Io {
        source: io::Error,
        path: PathBuf,
    },
}

pub type AssetResult<T> = Result<T, AssetError>;

/// A file as it currently exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    pub extension: String,
    pub size_bytes: u64,
}

/// Layout of the asset tree: `<root>/videos/originals` holds acquired source
/// files, `<root>/videos/clips` holds produced clips and their thumbnails.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    originals_dir: PathBuf,
    clips_dir: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let videos = root.join("videos");
        Self {
            originals_dir: videos.join("originals"),
            clips_dir: videos.join("clips"),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn originals_dir(&self) -> &Path {
        &self.originals_dir
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    pub async fn ensure_directories(&self) -> AssetResult<()> {
        for dir in [&self.originals_dir, &self.clips_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|source| AssetError::Io {
                    path: dir.clone(),
                    source,
                })?;
        }
        debug!(root = %self.root.display(), "asset directories ready");
        Ok(())
    }

    pub fn original_path(&self, item_id: &str) -> AssetResult<PathBuf> {
        validate_id(item_id)?;
        Ok(self
            .originals_dir
            .join(format!("{item_id}.{ORIGINAL_EXTENSION}")))
    }

    pub fn clip_video_path(&self, clip_id: &str) -> AssetResult<PathBuf> {
        self.clip_path(clip_id, CLIP_EXTENSION)
    }

    pub fn clip_thumbnail_path(&self, clip_id: &str) -> AssetResult<PathBuf> {
        self.clip_path(clip_id, THUMBNAIL_EXTENSION)
    }

    pub fn clip_subtitle_path(&self, clip_id: &str) -> AssetResult<PathBuf> {
        self.clip_path(clip_id, SUBTITLE_EXTENSION)
    }

    pub fn clip_audio_path(&self, clip_id: &str) -> AssetResult<PathBuf> {
        self.clip_path(clip_id, AUDIO_EXTENSION)
    }

    fn clip_path(&self, clip_id: &str, extension: &str) -> AssetResult<PathBuf> {
        validate_id(clip_id)?;
        Ok(self.clips_dir.join(format!("{clip_id}.{extension}")))
    }

    /// Stats the acquired original for `item_id`, if one exists.
    pub async fn original_info(&self, item_id: &str) -> AssetResult<Option<FileDescriptor>> {
        let path = self.original_path(item_id)?;
        match describe_file(&path).await {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(AssetError::NotOnDisk { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn write_clip_subtitle(&self, clip_id: &str, content: &str) -> AssetResult<PathBuf> {
        let path = self.clip_subtitle_path(clip_id)?;
        write_file(&path, content.as_bytes()).await?;
        Ok(path)
    }

    /// Points `originals/{item_id}.mp4` at a file the media server already
    /// keeps on local disk, replacing any previous entry.
    pub async fn link_original(&self, item_id: &str, source: &Path) -> AssetResult<PathBuf> {
        let target = self.original_path(item_id)?;
        if fs::symlink_metadata(&target).await.is_ok() {
            remove_file(&target).await?;
        }
        symlink(source, &target)
            .await
            .map_err(|source| AssetError::Io {
                path: target.clone(),
                source,
            })?;
        debug!(item_id, source = %source.display(), "linked local original");
        Ok(target)
    }

    /// Removes a file, logging rather than failing when it cannot be deleted.
    pub async fn discard(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), error = %err, "failed to remove asset"),
        }
    }
}

pub async fn describe_file(path: &Path) -> AssetResult<FileDescriptor> {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(AssetError::NotOnDisk {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(AssetError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(FileDescriptor {
        name,
        extension,
        size_bytes: metadata.len(),
    })
}

async fn write_file(path: &Path, contents: &[u8]) -> AssetResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| AssetError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(path, contents)
        .await
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn remove_file(path: &Path) -> AssetResult<()> {
    fs::remove_file(path)
        .await
        .map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
async fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    fs::symlink(source, target).await
}

#[cfg(windows)]
async fn symlink(source: &Path, target: &Path) -> io::Result<()> {
    fs::symlink_file(source, target).await
}

/// Ids become file stems, so anything that could escape the asset tree is
/// rejected.
fn validate_id(id: &str) -> AssetResult<()> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(AssetError::InvalidId { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn paths_follow_asset_layout() {
        let store = AssetStore::new("/srv/assets");
        assert_eq!(
            store.original_path("abc123").unwrap(),
            PathBuf::from("/srv/assets/videos/originals/abc123.mp4")
        );
        assert_eq!(
            store.clip_thumbnail_path("42").unwrap(),
            PathBuf::from("/srv/assets/videos/clips/42.jpg")
        );
        assert_eq!(
            store.clip_subtitle_path("42").unwrap(),
            PathBuf::from("/srv/assets/videos/clips/42.srt")
        );
        assert_eq!(
            store.clip_audio_path("42").unwrap(),
            PathBuf::from("/srv/assets/videos/clips/42.mp3")
        );
    }

    #[test]
    fn traversal_ids_are_rejected() {
        let store = AssetStore::new("/srv/assets");
        for id in ["", "../etc/passwd", "..", "a/b", ".hidden"] {
            assert!(
                matches!(store.original_path(id), Err(AssetError::InvalidId { .. })),
                "{id:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn original_info_reports_size_when_present() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        store.ensure_directories().await.unwrap();
        assert!(store.original_info("item").await.unwrap().is_none());

        std::fs::write(store.original_path("item").unwrap(), vec![0u8; 1234]).unwrap();
        let info = store.original_info("item").await.unwrap().unwrap();
        assert_eq!(info.name, "item");
        assert_eq!(info.extension, "mp4");
        assert_eq!(info.size_bytes, 1234);
    }

    #[tokio::test]
    async fn link_original_replaces_existing_entry() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path().join("assets"));
        store.ensure_directories().await.unwrap();
        let library_file = dir.path().join("movie.mp4");
        std::fs::write(&library_file, b"library bytes").unwrap();
        std::fs::write(store.original_path("item").unwrap(), b"stale").unwrap();

        let linked = store.link_original("item", &library_file).await.unwrap();
        assert_eq!(std::fs::read(&linked).unwrap(), b"library bytes");
        let info = store.original_info("item").await.unwrap().unwrap();
        assert_eq!(info.size_bytes, 13);
    }

    #[tokio::test]
    async fn discard_ignores_missing_files() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        store.discard(&dir.path().join("missing.srt")).await;
    }
}
