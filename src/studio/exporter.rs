// SYNOID Reel Exporter
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Renders every segment of a timeline to an intermediate clip with identical
// encoding parameters, stitches them losslessly and verifies the result.
// The output file is created up front and removed again unless the whole
// export succeeds.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, error, info, warn};

use super::composer::{AudioSource, Caption, CaptionPosition, Segment, CAPTION_FADE};
use super::sequencer::Timeline;
use super::validation_gate::ValidationGate;
use super::video_stitcher::VideoStitcher;
use crate::config::{ffmpeg_color, VideoSettings};
use crate::error::ExportError;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportParams {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub sample_rate: u32,
}

impl ExportParams {
    pub fn new(video: &VideoSettings, output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            width: video.width,
            height: video.height,
            fps: video.fps,
            sample_rate: 44_100,
        }
    }
}

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub output_path: PathBuf,
    pub duration: f64,
    pub size_mb: f64,
    pub segments: usize,
}

/// Owns the output path until `commit`; dropping it uncommitted deletes the
/// partial file.
struct PartialOutput {
    path: PathBuf,
    committed: bool,
}

impl PartialOutput {
    fn create(path: &Path) -> Result<Self, ExportError> {
        let not_writable = |source| ExportError::NotWritable {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(not_writable)?;
        }
        std::fs::File::create(path).map_err(not_writable)?;
        Ok(Self {
            path: path.to_path_buf(),
            committed: false,
        })
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.committed {
            match std::fs::remove_file(&self.path) {
                Ok(()) => warn!("[EXPORT] Removed partial output {:?}", self.path),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => error!("[EXPORT] Could not remove partial output {:?}: {}", self.path, e),
            }
        }
    }
}

fn backslash_escape(value: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a literal value (a path, usually) for a filter option inside
/// `-filter_complex`: once for the option parser, once for the graph parser.
fn filter_escape(value: &str) -> String {
    let option_level = backslash_escape(value, &['\\', '\'', ':']);
    backslash_escape(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

/// `drawtext` filter for one caption whose text lives in `textfile`.
pub fn caption_filter(caption: &Caption, textfile: &Path, duration: f64) -> String {
    let style = &caption.style;
    let y = match caption.position {
        CaptionPosition::Center => "(h-text_h)/2".to_string(),
        CaptionPosition::Top(px) => px.to_string(),
    };

    let mut params = vec![
        format!("textfile={}", filter_escape(&textfile.to_string_lossy())),
        "expansion=none".to_string(),
        format!("fontsize={}", style.font_size),
        format!("fontcolor={}", ffmpeg_color(style.color)),
        format!("line_spacing={}", style.font_size * 35 / 100),
        "x=(w-text_w)/2".to_string(),
        format!("y={}", y),
    ];
    if let Some(font) = &style.font_path {
        params.push(format!("fontfile={}", filter_escape(&font.to_string_lossy())));
    }
    if style.stroke_width > 0 {
        params.push(format!("borderw={}", style.stroke_width));
        params.push(format!("bordercolor={}", ffmpeg_color(style.stroke_color)));
    }
    if caption.fade && duration > 2.0 * CAPTION_FADE {
        params.push(format!(
            "alpha='if(lt(t,{f}),t/{f},if(gt(t,{d:.3}-{f}),({d:.3}-t)/{f},1))'",
            f = CAPTION_FADE,
            d = duration
        ));
    }

    format!("drawtext={}", params.join(":"))
}

/// Full `-filter_complex` graph for one segment. Video: still frame forced to
/// the output geometry and rate, captions on top. Audio: resampled to a fixed
/// layout and padded with silence so `-t` alone decides the length.
pub fn segment_filter(segment: &Segment, params: &ExportParams, caption_files: &[PathBuf]) -> String {
    let (w, h) = (params.width, params.height);
    let mut video = vec![
        format!("scale={w}:{h}:force_original_aspect_ratio=decrease"),
        format!("pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"),
        "setsar=1".to_string(),
        format!("fps={}", params.fps),
    ];
    for (caption, file) in segment.captions.iter().zip(caption_files) {
        video.push(caption_filter(caption, file, segment.duration));
    }
    video.push("format=yuv420p".to_string());

    format!(
        "[0:v]{}[v];[1:a]aresample={},aformat=sample_fmts=fltp:channel_layouts=stereo,apad[a]",
        video.join(","),
        params.sample_rate
    )
}

/// Argument list for rendering `segment` into `output`.
pub fn segment_args(
    segment: &Segment,
    params: &ExportParams,
    caption_files: &[PathBuf],
    output: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |a: &str| args.push(a.into());

    push("-y");
    push("-v");
    push("error");
    push("-loop");
    push("1");
    push("-framerate");
    push(&params.fps.to_string());
    push("-i");
    args.push(segment.frame.path.clone().into_os_string());

    match &segment.audio {
        Some(AudioSource::Speech(asset)) => {
            args.push("-i".into());
            args.push(asset.path.clone().into_os_string());
        }
        Some(AudioSource::Loop(path)) => {
            args.extend(["-stream_loop".into(), "-1".into(), "-i".into()]);
            args.push(path.clone().into_os_string());
        }
        None => {
            args.extend(["-f".into(), "lavfi".into(), "-i".into()]);
            args.push(format!("anullsrc=r={}:cl=stereo", params.sample_rate).into());
        }
    }

    let tail = [
        "-filter_complex".to_string(),
        segment_filter(segment, params, caption_files),
        "-map".to_string(),
        "[v]".to_string(),
        "-map".to_string(),
        "[a]".to_string(),
        "-t".to_string(),
        format!("{:.3}", segment.duration),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-r".to_string(),
        params.fps.to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-ar".to_string(),
        params.sample_rate.to_string(),
        "-ac".to_string(),
        "2".to_string(),
    ];
    args.extend(tail.into_iter().map(OsString::from));
    args.push(output.as_os_str().to_os_string());
    args
}

async fn render_segment(
    index: usize,
    total: usize,
    segment: &Segment,
    params: &ExportParams,
    work_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let mut caption_files = Vec::with_capacity(segment.captions.len());
    for (i, caption) in segment.captions.iter().enumerate() {
        let path = work_dir.join(format!("seg_{:03}_caption_{}.txt", index, i));
        tokio::fs::write(&path, caption.text()).await?;
        caption_files.push(path);
    }

    let clip = work_dir.join(format!("seg_{:03}.mp4", index));
    let args = segment_args(segment, params, &caption_files, &clip);
    debug!("[EXPORT] ffmpeg {:?}", args);

    let output = Command::new("ffmpeg")
        .args(&args)
        .output()
        .await
        .map_err(|e| ExportError::Encoder {
            stage: format!("render of {}", segment.kind.label()),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        error!("[EXPORT] ❌ {} failed: {}", segment.kind.label(), stderr);
        return Err(ExportError::Encoder {
            stage: format!("render of {}", segment.kind.label()),
            detail: stderr,
        });
    }

    info!(
        "[EXPORT] Rendered {} ({}/{}, {:.2}s)",
        segment.kind.label(),
        index + 1,
        total,
        segment.duration
    );
    Ok(clip)
}

/// Render, stitch and verify `timeline` into `params.output`.
pub async fn export(
    timeline: &Timeline,
    params: &ExportParams,
    work_dir: &Path,
) -> Result<ExportReport, ExportError> {
    timeline.validate(params.width, params.height)?;
    let guard = PartialOutput::create(&params.output)?;

    info!(
        "[EXPORT] Rendering {} segments at {}x{} @ {}fps",
        timeline.len(),
        params.width,
        params.height,
        params.fps
    );

    let mut clips = Vec::with_capacity(timeline.len());
    for (index, segment) in timeline.segments().iter().enumerate() {
        clips.push(render_segment(index, timeline.len(), segment, params, work_dir).await?);
    }

    VideoStitcher::finalize(&clips, work_dir, &params.output).await?;
    ValidationGate::verify(&params.output).await?;

    let size_mb = std::fs::metadata(&params.output)?.len() as f64 / 1_048_576.0;
    guard.commit();

    let report = ExportReport {
        output_path: params.output.clone(),
        duration: timeline.total_duration(),
        size_mb,
        segments: timeline.len(),
    };
    info!(
        "[EXPORT] ✅ {:?}: {:.2}s, {:.2} MB",
        report.output_path, report.duration, report.size_mb
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::composer::{CaptionStyle, SegmentKind};
    use crate::studio::image_tools::FrameAsset;
    use crate::studio::voice::AudioAsset;
    use image::Rgb;

    fn params() -> ExportParams {
        ExportParams {
            output: PathBuf::from("/tmp/out.mp4"),
            width: 1080,
            height: 1920,
            fps: 30,
            sample_rate: 44_100,
        }
    }

    fn style() -> CaptionStyle {
        CaptionStyle {
            font_size: 80,
            color: Rgb([255, 255, 255]),
            stroke_color: Rgb([0, 0, 0]),
            stroke_width: 3,
            font_path: None,
        }
    }

    fn segment(audio: Option<AudioSource>, captions: Vec<Caption>) -> Segment {
        Segment {
            kind: SegmentKind::Question(0),
            frame: FrameAsset {
                path: PathBuf::from("/tmp/q1.png"),
                width: 1080,
                height: 1920,
            },
            audio,
            captions,
            duration: 2.5,
        }
    }

    fn joined(args: &[OsString]) -> String {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_caption_filter_styles() {
        let caption = Caption::new("Coffee or tea?", style(), 900, CaptionPosition::Top(100));
        let f = caption_filter(&caption, Path::new("/tmp/c.txt"), 2.5);
        assert!(f.starts_with("drawtext=textfile=/tmp/c.txt:"));
        assert!(f.contains("fontcolor=0xFFFFFF"));
        assert!(f.contains("borderw=3:bordercolor=0x000000"));
        assert!(f.contains("y=100"));
        assert!(f.contains("alpha="));
        assert!(!f.contains("fontfile"));
    }

    #[test]
    fn test_caption_without_stroke_or_fade() {
        let mut s = style();
        s.stroke_width = 0;
        let mut caption = Caption::new("Hi", s, 900, CaptionPosition::Center);
        caption.fade = false;
        let f = caption_filter(&caption, Path::new("/tmp/c.txt"), 2.5);
        assert!(!f.contains("borderw"));
        assert!(!f.contains("alpha"));
        assert!(f.contains("y=(h-text_h)/2"));
    }

    #[test]
    fn test_speech_segment_args() {
        let audio = AudioSource::Speech(AudioAsset {
            path: PathBuf::from("/tmp/q1.mp3"),
            duration: 2.5,
        });
        let args = segment_args(&segment(Some(audio), vec![]), &params(), &[], Path::new("/tmp/seg.mp4"));
        let cmd = joined(&args);
        assert!(cmd.contains("-loop 1 -framerate 30 -i /tmp/q1.png -i /tmp/q1.mp3"));
        assert!(cmd.contains("-t 2.500"));
        assert!(cmd.ends_with("/tmp/seg.mp4"));
        assert!(!cmd.contains("anullsrc"));
    }

    #[test]
    fn test_loop_and_silent_segment_args() {
        let looped = segment(Some(AudioSource::Loop(PathBuf::from("/tmp/clock.mp3"))), vec![]);
        let cmd = joined(&segment_args(&looped, &params(), &[], Path::new("/tmp/p.mp4")));
        assert!(cmd.contains("-stream_loop -1 -i /tmp/clock.mp3"));

        let silent = segment(None, vec![]);
        let cmd = joined(&segment_args(&silent, &params(), &[], Path::new("/tmp/s.mp4")));
        assert!(cmd.contains("-f lavfi -i anullsrc=r=44100:cl=stereo"));
    }

    #[test]
    fn test_filter_normalizes_geometry() {
        let caption = Caption::new("Q", style(), 900, CaptionPosition::Center);
        let seg = segment(None, vec![caption]);
        let graph = segment_filter(&seg, &params(), &[PathBuf::from("/tmp/c0.txt")]);
        assert!(graph.starts_with("[0:v]scale=1080:1920:force_original_aspect_ratio=decrease,pad=1080:1920"));
        assert!(graph.contains("fps=30"));
        assert!(graph.contains("drawtext=textfile=/tmp/c0.txt:"));
        assert!(graph.contains("[1:a]aresample=44100"));
        assert!(graph.ends_with("apad[a]"));
    }

    #[test]
    fn test_filter_escape_keeps_backslashes_literal() {
        assert_eq!(filter_escape("/tmp/plain.txt"), "/tmp/plain.txt");
        // A backslash in a Unix file name survives both parsing levels.
        assert_eq!(filter_escape(r"/tmp/a\b.txt"), r"/tmp/a\\\\b.txt");
        assert_eq!(filter_escape("it's"), r"it\\\'s");
        assert_eq!(filter_escape(r"C:\fonts\a.ttf"), r"C\\\:\\\\fonts\\\\a.ttf");
        assert_eq!(filter_escape("a,b[1];"), r"a\,b\[1\]\;");
    }

    #[test]
    fn test_font_path_with_specials_is_escaped() {
        let mut s = style();
        s.font_path = Some(PathBuf::from(r"/fonts/odd\name,1.ttf"));
        let caption = Caption::new("Hi", s, 900, CaptionPosition::Center);
        let f = caption_filter(&caption, Path::new("/tmp/c.txt"), 2.5);
        assert!(f.contains(r"fontfile=/fonts/odd\\\\name\,1.ttf"), "{f}");
    }

    #[tokio::test]
    async fn test_invalid_timeline_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = params();
        p.output = dir.path().join("reel.mp4");
        let result = export(&Timeline::default(), &p, dir.path()).await;
        assert!(matches!(result, Err(ExportError::NoSegments)));
        assert!(!p.output.exists());
    }

    #[test]
    fn test_partial_output_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reel.mp4");
        {
            let _guard = PartialOutput::create(&path).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());

        let guard = PartialOutput::create(&path).unwrap();
        guard.commit();
        assert!(path.exists());
    }
}
