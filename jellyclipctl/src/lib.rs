use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jellyclip_core::av::retime;
use jellyclip_core::{
    load_clipper_config, CatalogItem, ClipArtifact, ClipProducer, ClipSpec, ClipperContext,
    CommandExecutor, FileDescriptor, MediaSourceDescriptor, ProgressEvent, StaticUrlResolver,
    StreamSelection, SubtitleTrack, SystemCommandExecutor,
};
use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

pub type Result<T> = std::result::Result<T, AppError>;

const PROGRESS_FLUSH_WAIT: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] jellyclip_core::ConfigError),
    #[error("io error at {path}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] jellyclip_core::CatalogError),
    #[error(transparent)]
    Acquire(#[from] jellyclip_core::AcquireError),
    #[error(transparent)]
    Task(#[from] jellyclip_core::TaskError),
    #[error(transparent)]
    Media(#[from] jellyclip_core::AvError),
    #[error(transparent)]
    Asset(#[from] jellyclip_core::AssetError),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("one or more checks failed")]
    CheckFailed,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "JellyClip media acquisition and clip production", long_about = None)]
pub struct Cli {
    /// Path to jellyclip.toml
    #[arg(long, default_value = "configs/jellyclip.toml")]
    pub config: PathBuf,
    /// Overrides paths.asset_root
    #[arg(long)]
    pub asset_root: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reports the video codec and container of a file or URL
    Probe(ProbeArgs),
    /// Acquires an item's original, reusing a matching file on disk
    Fetch(FetchArgs),
    /// Cuts a clip out of a local original
    Clip(ClipArgs),
    /// Extracts a thumbnail from an existing clip
    Thumbnail(ThumbnailArgs),
    /// Extracts an existing clip's audio as mp3
    Audio(AudioArgs),
    /// Shifts SRT cue timings back by an offset
    Retime(RetimeArgs),
    /// Verifies the media tools and asset directories
    Check,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    pub uri: String,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    pub item_id: String,
    /// Download URL (http, https or file)
    #[arg(long)]
    pub url: String,
    /// Expected size of the original in bytes
    #[arg(long, conflicts_with = "item")]
    pub size: Option<u64>,
    /// Catalog item JSON to take the media source from
    #[arg(long)]
    pub item: Option<PathBuf>,
    /// Catalog index of the audio stream to download
    #[arg(long)]
    pub audio_stream: Option<u32>,
    /// Catalog index of the subtitle stream to download
    #[arg(long)]
    pub subtitle_stream: Option<u32>,
    /// Suppresses progress lines on stderr
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl FetchArgs {
    fn selection(&self) -> StreamSelection {
        StreamSelection {
            audio_stream_index: self.audio_stream,
            subtitle_stream_index: self.subtitle_stream,
        }
    }
}

#[derive(Args, Debug)]
pub struct ClipArgs {
    pub clip_id: String,
    /// Source file or URL to cut from
    #[arg(long)]
    pub source: String,
    #[arg(long)]
    pub start: f64,
    #[arg(long)]
    pub end: f64,
    /// SRT file burned into the clip
    #[arg(long)]
    pub subtitles: Option<PathBuf>,
    #[arg(long, default_value = "und", requires = "subtitles")]
    pub language: String,
    #[arg(long, default_value = "", requires = "subtitles")]
    pub title: String,
    /// Also extracts the default thumbnail
    #[arg(long, default_value_t = false)]
    pub thumbnail: bool,
}

#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    pub clip_id: String,
    /// Position within the clip, in percent of its duration
    #[arg(long)]
    pub percent: Option<f64>,
}

#[derive(Args, Debug)]
pub struct AudioArgs {
    pub clip_id: String,
}

#[derive(Args, Debug)]
pub struct RetimeArgs {
    pub file: PathBuf,
    /// Seconds to subtract from every cue
    #[arg(long, allow_hyphen_values = true)]
    pub offset: f64,
}

pub async fn run(cli: Cli) -> Result<()> {
    let context = AppContext::new(&cli)?;

    match &cli.command {
        Commands::Probe(args) => {
            let report = context.probe(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Fetch(args) => {
            let report = context.fetch(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Clip(args) => {
            let report = context.clip(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Thumbnail(args) => {
            let report = context.thumbnail(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Audio(args) => {
            let report = context.audio(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Retime(args) => {
            let report = retime_file(args).await?;
            render(&report, cli.format)?;
        }
        Commands::Check => {
            let report = context.check().await;
            render(&report, cli.format)?;
            if report
                .iter()
                .any(|entry| matches!(entry.status, CheckStatus::Error))
            {
                return Err(AppError::CheckFailed);
            }
        }
    }

    Ok(())
}

fn render<T>(value: &T, format: OutputFormat) -> Result<()>
where
    T: Serialize + DisplayFallback,
{
    match format {
        OutputFormat::Text => {
            println!("{}", value.display());
            Ok(())
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{}", json);
            Ok(())
        }
    }
}

trait DisplayFallback {
    fn display(&self) -> String;
}

struct AppContext {
    clipper: ClipperContext,
}

impl AppContext {
    fn new(cli: &Cli) -> Result<Self> {
        let mut config = load_clipper_config(&cli.config)?;
        if let Some(root) = &cli.asset_root {
            config.paths.asset_root = root.clone();
        }
        debug!(asset_root = %config.paths.asset_root.display(), "configuration loaded");
        Ok(Self {
            clipper: ClipperContext::new(config)?,
        })
    }

    async fn probe(&self, args: &ProbeArgs) -> Result<ProbeReport> {
        let result = self.clipper.probe().probe(&args.uri).await?;
        Ok(ProbeReport {
            uri: args.uri.clone(),
            codec: result.codec.to_string(),
            container: result.container.to_string(),
            locally_usable: ClipProducer::is_locally_usable(&result),
        })
    }

    async fn fetch(&self, args: &FetchArgs) -> Result<FetchReport> {
        let descriptor = match (&args.item, args.size) {
            (Some(path), _) => load_item(path).await?.primary_source()?.clone(),
            (None, Some(size_bytes)) => MediaSourceDescriptor {
                id: args.item_id.clone(),
                size_bytes,
                container: None,
                path: None,
                media_streams: Vec::new(),
            },
            (None, None) => {
                return Err(AppError::InvalidArguments(
                    "either --size or --item is required".into(),
                ))
            }
        };

        let selection = args.selection();
        selection.validate(&args.item_id, &descriptor)?;

        let mut progress = self.clipper.bus().subscribe_for_item(args.item_id.as_str());
        let handle = self.clipper.acquisition().start(
            self.clipper.registry(),
            &args.item_id,
            descriptor,
            selection,
            Arc::new(StaticUrlResolver::new(args.url.clone())),
        );
        let finished = handle.wait();
        tokio::pin!(finished);
        let file = loop {
            tokio::select! {
                outcome = &mut finished => break outcome?,
                Some(event) = progress.next(), if !args.quiet => report_progress(&event),
            }
        };
        if !args.quiet {
            flush_progress(&mut progress, report_progress).await;
        }

        let path = self.clipper.assets().original_path(&args.item_id)?;
        info!(item_id = %args.item_id, path = %path.display(), "fetch finished");
        Ok(FetchReport {
            item_id: args.item_id.clone(),
            path,
            file,
        })
    }

    async fn clip(&self, args: &ClipArgs) -> Result<ClipReport> {
        let subtitle_track = match &args.subtitles {
            Some(path) => Some(SubtitleTrack {
                content: read_text(path).await?,
                language: args.language.clone(),
                title: args.title.clone(),
            }),
            None => None,
        };
        let spec = ClipSpec {
            clip_id: args.clip_id.clone(),
            source_uri: args.source.clone(),
            start: args.start,
            end: args.end,
            subtitle_track,
        };
        let producer = self.clipper.producer();
        let clip = producer.produce_clip(&spec).await?;
        let thumbnail = if args.thumbnail {
            Some(
                producer
                    .produce_thumbnail(&spec.clip_id, producer.default_thumbnail_percent())
                    .await?,
            )
        } else {
            None
        };
        Ok(ClipReport { clip, thumbnail })
    }

    async fn thumbnail(&self, args: &ThumbnailArgs) -> Result<ThumbnailReport> {
        let producer = self.clipper.producer();
        let percent = args
            .percent
            .unwrap_or_else(|| producer.default_thumbnail_percent());
        let path = producer.produce_thumbnail(&args.clip_id, percent).await?;
        Ok(ThumbnailReport {
            clip_id: args.clip_id.clone(),
            path,
        })
    }

    async fn audio(&self, args: &AudioArgs) -> Result<AudioReport> {
        let path = self.clipper.producer().produce_audio(&args.clip_id).await?;
        Ok(AudioReport {
            clip_id: args.clip_id.clone(),
            path,
        })
    }

    async fn check(&self) -> Vec<HealthEntry> {
        let tools = &self.clipper.config().tools;
        let mut report = vec![
            check_tool("ffmpeg", &tools.ffmpeg).await,
            check_tool("ffprobe", &tools.ffprobe).await,
        ];
        let assets = self.clipper.assets();
        report.push(match assets.ensure_directories().await {
            Ok(()) => HealthEntry::ok("assets", assets.root().display().to_string()),
            Err(err) => HealthEntry::error("assets", err.to_string()),
        });
        report
    }
}

async fn check_tool(name: &str, program: &Path) -> HealthEntry {
    let mut command = Command::new(program);
    command.arg("-version").stdin(Stdio::null());
    match SystemCommandExecutor.run(&mut command).await {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string();
            HealthEntry::ok(name, version)
        }
        Ok(output) => HealthEntry::error(
            name,
            format!("exited with status {:?}", output.status.code()),
        ),
        Err(err) => HealthEntry::error(name, format!("{}: {err}", program.display())),
    }
}

/// Reports events still queued after the task finished, up to the
/// completion event.
async fn flush_progress<S>(progress: &mut S, mut report: impl FnMut(&ProgressEvent))
where
    S: Stream<Item = ProgressEvent> + Unpin,
{
    while let Ok(Some(event)) = tokio::time::timeout(PROGRESS_FLUSH_WAIT, progress.next()).await {
        report(&event);
        if event.is_complete() {
            break;
        }
    }
}

fn report_progress(event: &ProgressEvent) {
    eprintln!(
        "{}: {:.2}% ({}/{} bytes)",
        event.item_id, event.progress_percentage, event.downloaded_bytes, event.total_size_bytes
    );
}

async fn retime_file(args: &RetimeArgs) -> Result<RetimeReport> {
    if !args.offset.is_finite() {
        return Err(AppError::InvalidArguments(format!(
            "offset must be a finite number of seconds, got {}",
            args.offset
        )));
    }
    let content = read_text(&args.file).await?;
    Ok(RetimeReport {
        file: args.file.clone(),
        offset_seconds: args.offset,
        content: retime::shift(&content, args.offset),
    })
}

async fn load_item(path: &Path) -> Result<CatalogItem> {
    let raw = read_text(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Io {
            source,
            path: path.to_path_buf(),
        })
}

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub uri: String,
    pub codec: String,
    pub container: String,
    pub locally_usable: bool,
}

impl DisplayFallback for ProbeReport {
    fn display(&self) -> String {
        format!(
            "{uri}\n  codec: {codec}\n  container: {container}\n  locally usable: {usable}",
            uri = self.uri,
            codec = self.codec,
            container = self.container,
            usable = if self.locally_usable { "yes" } else { "no" }
        )
    }
}

#[derive(Debug, Serialize)]
pub struct FetchReport {
    pub item_id: String,
    pub path: PathBuf,
    pub file: FileDescriptor,
}

impl DisplayFallback for FetchReport {
    fn display(&self) -> String {
        format!(
            "{item}: {path} ({size} bytes)",
            item = self.item_id,
            path = self.path.display(),
            size = self.file.size_bytes
        )
    }
}

#[derive(Debug, Serialize)]
pub struct ClipReport {
    pub clip: ClipArtifact,
    pub thumbnail: Option<PathBuf>,
}

impl DisplayFallback for ClipReport {
    fn display(&self) -> String {
        let mut lines = vec![format!(
            "{clip}: {path} ({duration:.3}s{subtitles})",
            clip = self.clip.clip_id,
            path = self.clip.video_path.display(),
            duration = self.clip.duration_seconds,
            subtitles = if self.clip.subtitles_burned {
                ", subtitles burned"
            } else {
                ""
            }
        )];
        if let Some(thumbnail) = &self.thumbnail {
            lines.push(format!("  thumbnail: {}", thumbnail.display()));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct ThumbnailReport {
    pub clip_id: String,
    pub path: PathBuf,
}

impl DisplayFallback for ThumbnailReport {
    fn display(&self) -> String {
        format!("{}: {}", self.clip_id, self.path.display())
    }
}

#[derive(Debug, Serialize)]
pub struct AudioReport {
    pub clip_id: String,
    pub path: PathBuf,
}

impl DisplayFallback for AudioReport {
    fn display(&self) -> String {
        format!("{}: {}", self.clip_id, self.path.display())
    }
}

#[derive(Debug, Serialize)]
pub struct RetimeReport {
    pub file: PathBuf,
    pub offset_seconds: f64,
    pub content: String,
}

impl DisplayFallback for RetimeReport {
    fn display(&self) -> String {
        self.content.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthEntry {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub enum CheckStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Ok => "OK",
            CheckStatus::Error => "ERROR",
        };
        write!(f, "{}", label)
    }
}

impl HealthEntry {
    fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
            detail: detail.into(),
        }
    }

    fn error(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Error,
            detail: detail.into(),
        }
    }
}

impl DisplayFallback for HealthEntry {
    fn display(&self) -> String {
        format!(
            "[{status}] {name}: {detail}",
            status = self.status,
            name = self.name,
            detail = self.detail
        )
    }
}

impl DisplayFallback for Vec<HealthEntry> {
    fn display(&self) -> String {
        self.iter()
            .map(DisplayFallback::display)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn prepare_test_context(command: Commands) -> (TempDir, Cli, AppContext) {
        let temp = TempDir::new().unwrap();
        let configs_dir = temp.path().join("configs");
        fs::create_dir_all(&configs_dir).unwrap();
        fs::copy("../configs/jellyclip.toml", configs_dir.join("jellyclip.toml")).unwrap();

        let cli = Cli {
            config: configs_dir.join("jellyclip.toml"),
            asset_root: Some(temp.path().join("assets")),
            format: OutputFormat::Json,
            command,
        };
        let context = AppContext::new(&cli).unwrap();
        (temp, cli, context)
    }

    fn file_url(path: &Path) -> String {
        format!("file://{}", path.display())
    }

    #[test]
    fn parses_clip_command() {
        let cli = Cli::try_parse_from([
            "jellyclipctl",
            "--format",
            "json",
            "clip",
            "clip-1",
            "--source",
            "assets/videos/originals/item.mp4",
            "--start",
            "12.5",
            "--end",
            "20",
            "--subtitles",
            "subs.srt",
            "--language",
            "eng",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        let Commands::Clip(args) = cli.command else {
            panic!("expected clip command");
        };
        assert_eq!(args.start, 12.5);
        assert_eq!(args.language, "eng");
        assert_eq!(args.subtitles, Some(PathBuf::from("subs.srt")));
    }

    #[test]
    fn language_requires_subtitles() {
        let parsed = Cli::try_parse_from([
            "jellyclipctl",
            "clip",
            "clip-1",
            "--source",
            "a.mp4",
            "--start",
            "0",
            "--end",
            "1",
            "--language",
            "eng",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_fetch_stream_selection() {
        let cli = Cli::try_parse_from([
            "jellyclipctl",
            "fetch",
            "item-1",
            "--url",
            "http://media.local/item-1.mkv",
            "--size",
            "10",
            "--audio-stream",
            "2",
        ])
        .unwrap();
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch command");
        };
        assert_eq!(
            args.selection(),
            StreamSelection {
                audio_stream_index: Some(2),
                subtitle_stream_index: None,
            }
        );
    }

    #[test]
    fn retime_accepts_negative_offsets() {
        let cli = Cli::try_parse_from(["jellyclipctl", "retime", "a.srt", "--offset", "-2.5"]).unwrap();
        let Commands::Retime(args) = cli.command else {
            panic!("expected retime command");
        };
        assert_eq!(args.offset, -2.5);
    }

    #[tokio::test]
    async fn asset_root_override_wins() {
        let (temp, _cli, context) = prepare_test_context(Commands::Check);
        assert_eq!(context.clipper.assets().root(), temp.path().join("assets"));
    }

    #[tokio::test]
    async fn fetch_downloads_from_file_url() {
        let (temp, _cli, context) = prepare_test_context(Commands::Check);
        let upstream = temp.path().join("upstream.mkv");
        fs::write(&upstream, vec![7u8; 150_000]).unwrap();

        let report = context
            .fetch(&FetchArgs {
                item_id: "item-1".into(),
                url: file_url(&upstream),
                size: Some(150_000),
                item: None,
                audio_stream: None,
                subtitle_stream: None,
                quiet: true,
            })
            .await
            .unwrap();
        assert_eq!(report.file.size_bytes, 150_000);
        assert_eq!(report.path, temp.path().join("assets/videos/originals/item-1.mp4"));
        assert!(report.path.exists());
    }

    #[tokio::test]
    async fn fetch_rejects_item_without_audio() {
        let (temp, _cli, context) = prepare_test_context(Commands::Check);
        let item = temp.path().join("item.json");
        fs::write(
            &item,
            r#"{"Id":"item-1","MediaSources":[{"Id":"src","Size":10,"MediaStreams":[{"Type":"Video","Index":0}]}]}"#,
        )
        .unwrap();
        let err = context
            .fetch(&FetchArgs {
                item_id: "item-1".into(),
                url: "file:///unused.mkv".into(),
                size: None,
                item: Some(item),
                audio_stream: None,
                subtitle_stream: None,
                quiet: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Catalog(jellyclip_core::CatalogError::NoAudioStreams { .. })
        ));
    }

    #[tokio::test]
    async fn fetch_rejects_unknown_audio_stream() {
        let (temp, _cli, context) = prepare_test_context(Commands::Check);
        let item = temp.path().join("item.json");
        fs::write(
            &item,
            r#"{"Id":"item-1","MediaSources":[{"Id":"src","Size":10,"MediaStreams":[{"Type":"Audio","Index":1}]}]}"#,
        )
        .unwrap();
        let err = context
            .fetch(&FetchArgs {
                item_id: "item-1".into(),
                url: "file:///unused.mkv".into(),
                size: None,
                item: Some(item),
                audio_stream: Some(4),
                subtitle_stream: None,
                quiet: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Catalog(jellyclip_core::CatalogError::InvalidStreamSelection { index: 4, .. })
        ));
    }

    #[tokio::test]
    async fn queued_progress_is_reported_through_completion() {
        let bus = jellyclip_core::ProgressBus::new(16);
        let mut progress = bus.subscribe_for_item("item-1");
        bus.publish(ProgressEvent::new("item-1", 50, 100));
        bus.publish(ProgressEvent::completed("item-1", 100, 100));
        bus.publish(ProgressEvent::new("item-1", 0, 100));

        let mut reported = Vec::new();
        flush_progress(&mut progress, |event| reported.push(event.progress_percentage)).await;
        assert_eq!(reported, vec![50.0, 100.0]);

        let mut idle = bus.subscribe_for_item("item-2");
        flush_progress(&mut idle, |_| panic!("nothing was published for item-2")).await;
    }

    #[tokio::test]
    async fn fetch_requires_size_or_item() {
        let (_temp, _cli, context) = prepare_test_context(Commands::Check);
        let err = context
            .fetch(&FetchArgs {
                item_id: "item-1".into(),
                url: "file:///unused.mkv".into(),
                size: None,
                item: None,
                audio_stream: None,
                subtitle_stream: None,
                quiet: true,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn retime_shifts_file_contents() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("subs.srt");
        fs::write(&file, "1\n00:00:12,000 --> 00:00:14,500\nHello\n").unwrap();
        let report = retime_file(&RetimeArgs {
            file: file.clone(),
            offset: 10.0,
        })
        .await
        .unwrap();
        assert_eq!(report.content, "1\n00:00:02,000 --> 00:00:04,500\nHello\n");
        assert_eq!(report.display(), report.content);
    }

    #[tokio::test]
    async fn retime_rejects_non_finite_offsets() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("subs.srt");
        fs::write(&file, "1\n00:00:12,000 --> 00:00:14,500\nHello\n").unwrap();
        for offset in [f64::NEG_INFINITY, f64::NAN] {
            let err = retime_file(&RetimeArgs {
                file: file.clone(),
                offset,
            })
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::InvalidArguments(_)));
        }
    }

    #[test]
    fn health_report_renders_one_line_per_entry() {
        let report = vec![
            HealthEntry::ok("ffmpeg", "ffmpeg version 6.1"),
            HealthEntry::error("ffprobe", "not found"),
        ];
        assert_eq!(
            report.display(),
            "[OK] ffmpeg: ffmpeg version 6.1\n[ERROR] ffprobe: not found"
        );
    }
}
