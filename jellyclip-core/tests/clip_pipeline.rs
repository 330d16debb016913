use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jellyclip_core::{
    AvError, ClipSpec, ClipperConfig, ClipperContext, CommandExecutor, SubtitleTrack,
};
use tempfile::TempDir;
use tokio::process::Command;

/// Records every invocation and answers ffprobe duration queries.
#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingExecutor {
    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, command: &mut Command) -> std::io::Result<Output> {
        let std = command.as_std();
        let mut call = vec![std.get_program().to_string_lossy().into_owned()];
        call.extend(std.get_args().map(|arg| arg.to_string_lossy().into_owned()));
        let stdout = if call[0].ends_with("ffprobe") {
            b"20.000000\n".to_vec()
        } else {
            Vec::new()
        };
        self.calls.lock().unwrap().push(call);
        Ok(Output {
            status: ExitStatus::from_raw(0),
            stdout,
            stderr: Vec::new(),
        })
    }
}

fn context(temp: &TempDir) -> (ClipperContext, Arc<RecordingExecutor>) {
    let mut config = ClipperConfig::default();
    config.paths.asset_root = temp.path().join("assets");
    let executor = Arc::new(RecordingExecutor::default());
    let context = ClipperContext::new(config)
        .unwrap()
        .with_executor(executor.clone());
    (context, executor)
}

fn spec(start: f64, end: f64, subtitles: Option<&str>) -> ClipSpec {
    ClipSpec {
        clip_id: "clip-1".into(),
        source_uri: "assets/videos/originals/item-1.mp4".into(),
        start,
        end,
        subtitle_track: subtitles.map(|content| SubtitleTrack {
            content: content.into(),
            language: "eng".into(),
            title: "English".into(),
        }),
    }
}

#[tokio::test]
async fn empty_range_fails_before_any_subprocess() {
    let temp = TempDir::new().unwrap();
    let (context, executor) = context(&temp);

    let err = context
        .producer()
        .produce_clip(&spec(5.0, 5.0, None))
        .await
        .unwrap_err();

    assert!(matches!(err, AvError::InvalidClipRange { .. }));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn clip_with_subtitles_then_thumbnail() {
    let temp = TempDir::new().unwrap();
    let (context, executor) = context(&temp);
    let srt = "1\n00:01:05,000 --> 00:01:07,000\nHi\n";

    let artifact = context
        .producer()
        .produce_clip(&spec(60.0, 80.0, Some(srt)))
        .await
        .unwrap();
    assert!(artifact.subtitles_burned);
    assert_eq!(artifact.duration_seconds, 20.0);
    assert!(!context
        .assets()
        .clip_subtitle_path("clip-1")
        .unwrap()
        .exists());

    let thumbnail = context
        .producer()
        .produce_thumbnail("clip-1", 10.0)
        .await
        .unwrap();
    assert_eq!(thumbnail, context.assets().clip_thumbnail_path("clip-1").unwrap());

    let calls = executor.calls();
    assert_eq!(calls.len(), 3);
    let encode = &calls[0];
    assert!(encode.windows(2).any(|w| w == ["-ss", "60.000"]));
    assert!(encode.windows(2).any(|w| w == ["-t", "20.000"]));
    assert!(encode.iter().any(|arg| arg.starts_with("subtitles=")));
    assert!(calls[1][0].ends_with("ffprobe"));
    assert!(calls[2].windows(2).any(|w| w == ["-ss", "2.000"]));
}
