pub mod acquisition;
pub mod assets;
pub mod av;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod prepare;
pub mod progress;
pub mod tasks;

pub use acquisition::{
    AcquireError, AcquireResult, CatalogError, CatalogItem, DownloadUrlResolver,
    MediaAcquisitionService, MediaSourceDescriptor, MediaStream, ResolvedDownload,
    StaticUrlResolver, StreamSelection, StreamType,
};
pub use assets::{AssetError, AssetResult, AssetStore, FileDescriptor};
pub use av::{
    AvError, AvResult, ClipArtifact, ClipProducer, ClipSpec, CompatibilityResult, MediaProbe,
    SubtitleTrack, VideoCodec, VideoContainer,
};
pub use command::{CommandExecutor, SystemCommandExecutor};
pub use config::{load_clipper_config, ClipperConfig};
pub use context::ClipperContext;
pub use error::{ConfigError, Result};
pub use prepare::{ClipPreparer, Preparation, PrepareError, PrepareResult};
pub use progress::{ProgressBus, ProgressEvent};
pub use tasks::{TaskError, TaskHandle, TaskRegistry, TaskResult, TaskState, TaskStatus};
