// SYNOID Reel Export Integration Tests
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Encoding tests run only where ffmpeg with drawtext and a TrueType font is
// available; they print a notice and pass otherwise.

mod common;

use std::path::{Path, PathBuf};
use std::process::Command;

use common::{small_settings, FakeVoice};
use synoid_reel::config::{ContentItem, ItemKind};
use synoid_reel::error::ExportError;
use synoid_reel::studio::composer::{Segment, SegmentKind};
use synoid_reel::studio::exporter::{self, ExportParams};
use synoid_reel::studio::image_tools::FrameAsset;
use synoid_reel::studio::sequencer::Timeline;
use synoid_reel::studio::{health, ImageSource, Layout, ReelPipeline, ReelRequest};

const FONT_CANDIDATES: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
];

async fn encoder_with_font() -> Option<&'static str> {
    if !health::missing_tools().await.is_empty() {
        return None;
    }
    // Only the duration check below needs ffprobe.
    let ffprobe = Command::new("ffprobe").arg("-version").output().ok()?;
    if !ffprobe.status.success() {
        return None;
    }
    let filters = Command::new("ffmpeg").args(["-hide_banner", "-filters"]).output().ok()?;
    if !String::from_utf8_lossy(&filters.stdout).contains("drawtext") {
        return None;
    }
    FONT_CANDIDATES.into_iter().find(|f| Path::new(f).exists())
}

fn probe_duration(path: &Path) -> f64 {
    let out = Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
        .arg(path)
        .output()
        .unwrap();
    String::from_utf8_lossy(&out.stdout).trim().parse().unwrap()
}

#[tokio::test]
async fn test_generate_reel_end_to_end() {
    let Some(font) = encoder_with_font().await else {
        eprintln!("skipping: ffmpeg with drawtext, ffprobe and a system font are not all available");
        return;
    };

    let settings = small_settings(&format!(r#", "font_path": "{}""#, font));
    let voice = FakeVoice::default();
    let dir = tempfile::tempdir().unwrap();
    let clock = dir.path().join("clock.wav");
    std::fs::write(&clock, common::wav_bytes(0.4)).unwrap();

    let request = ReelRequest {
        questions: ["Who's the better driver?", "Who falls asleep first?"]
            .iter()
            .enumerate()
            .map(|(i, q)| ContentItem::new(ItemKind::Question, i, *q))
            .collect(),
        hook: ContentItem::new(ItemKind::Hook, 0, "Let's see how well you know each other"),
        images: ImageSource::Placeholders,
        layout: Layout::Pair,
        sound_effect: Some(clock),
        output: dir.path().join("out").join("quiz.mp4"),
        theme: Some("Habits".into()),
        outro: None,
    };

    let pipeline = ReelPipeline::new(&settings, &voice).unwrap();
    let report = pipeline.run(&request).await.unwrap();

    assert!(report.output_path.exists());
    assert!(report.size_mb > 0.0);
    assert_eq!(report.segments, 5);
    let actual = probe_duration(&report.output_path);
    assert!(
        (actual - report.duration).abs() < 0.5,
        "file is {actual}s, timeline is {}s",
        report.duration
    );
}

fn frame(path: PathBuf) -> FrameAsset {
    FrameAsset {
        path,
        width: 216,
        height: 384,
    }
}

#[tokio::test]
async fn test_unwritable_output_is_rejected_before_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file, not a directory").unwrap();

    let segment = Segment {
        kind: SegmentKind::Pause,
        frame: frame(dir.path().join("bg.png")),
        audio: None,
        captions: vec![],
        duration: 1.0,
    };
    let timeline = Timeline::assemble(None, segment.clone(), vec![], &segment, None);
    let params = ExportParams::new(&small_settings("").video, blocker.join("reel.mp4"));

    let err = exporter::export(&timeline, &params, dir.path()).await.unwrap_err();
    assert!(matches!(err, ExportError::NotWritable { .. }));
}

#[tokio::test]
async fn test_encoder_failure_leaves_no_partial_output() {
    if !health::missing_tools().await.is_empty() {
        eprintln!("skipping: ffmpeg not available");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    // The frame file does not exist, so the first render fails.
    let segment = Segment {
        kind: SegmentKind::Hook,
        frame: frame(dir.path().join("missing.png")),
        audio: None,
        captions: vec![],
        duration: 1.0,
    };
    let timeline = Timeline::assemble(None, segment.clone(), vec![], &segment, None);
    let output = dir.path().join("reel.mp4");
    let params = ExportParams::new(&small_settings("").video, &output);

    let err = exporter::export(&timeline, &params, dir.path()).await.unwrap_err();
    assert!(matches!(err, ExportError::Encoder { .. }));
    assert!(!output.exists());
}
