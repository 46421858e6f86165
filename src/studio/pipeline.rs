// SYNOID Reel Pipeline
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Load → {Normalize, Synthesize} → Compose → Pause → Sequence → Export.
// Strictly linear and fail-fast; every intermediate lives in one temporary
// directory that disappears with the pipeline.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{error, info};

use super::composer::Composer;
use super::exporter::{self, ExportParams, ExportReport};
use super::health;
use super::image_tools::{FrameAsset, FrameJob, FrameRenderer, FrameSource, FrameSources};
use super::pause::build_pause;
use super::sequencer::Timeline;
use super::voice::{AudioAsset, SpeechSynthesizer};
use super::Layout;
use crate::config::{ContentItem, Settings};
use crate::error::{ConfigError, ImageError, ReelError};

/// Where question frames come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// User images in question order (two per question for `Layout::Pair`).
    Files {
        paths: Vec<PathBuf>,
        placeholder_fallback: bool,
    },
    /// Generated placeholders only.
    Placeholders,
}

impl ImageSource {
    /// Interpret the `--images` / `--create-placeholders` pair of flags.
    pub fn resolve(paths: Vec<PathBuf>, create_placeholders: bool) -> Result<Self, ConfigError> {
        match (paths.is_empty(), create_placeholders) {
            (true, true) => Ok(Self::Placeholders),
            (true, false) => Err(ConfigError::NoImageSource),
            (false, fallback) => Ok(Self::Files {
                paths,
                placeholder_fallback: fallback,
            }),
        }
    }
}

/// Everything a single reel needs beyond the settings.
#[derive(Debug, Clone)]
pub struct ReelRequest {
    pub questions: Vec<ContentItem>,
    pub hook: ContentItem,
    pub images: ImageSource,
    pub layout: Layout,
    pub sound_effect: Option<PathBuf>,
    pub output: PathBuf,
    pub theme: Option<String>,
    pub outro: Option<String>,
}

/// One `FrameJob` per question, writing into `frames_dir`.
pub fn plan_frames(
    questions: usize,
    images: &ImageSource,
    layout: Layout,
    frames_dir: &Path,
) -> Result<Vec<FrameJob>, ConfigError> {
    let output = |i: usize| frames_dir.join(format!("question_{}.png", i + 1));

    match images {
        ImageSource::Placeholders => Ok((0..questions)
            .map(|index| FrameJob {
                index,
                sources: match layout {
                    Layout::Single => FrameSources::Single(FrameSource::Placeholder),
                    Layout::Pair => FrameSources::Pair(FrameSource::Placeholder, FrameSource::Placeholder),
                },
                output: output(index),
            })
            .collect()),
        ImageSource::Files { paths, .. } => {
            let expected = questions * layout.images_per_question();
            if paths.len() != expected {
                return Err(ConfigError::ImageCountMismatch {
                    questions,
                    expected,
                    supplied: paths.len(),
                });
            }
            let file = |i: usize| FrameSource::File(paths[i].clone());
            Ok((0..questions)
                .map(|index| FrameJob {
                    index,
                    sources: match layout {
                        Layout::Single => FrameSources::Single(file(index)),
                        Layout::Pair => FrameSources::Pair(file(2 * index), file(2 * index + 1)),
                    },
                    output: output(index),
                })
                .collect())
        }
    }
}

pub struct ReelPipeline<'a, S> {
    settings: &'a Settings,
    synthesizer: S,
    work: TempDir,
}

impl<'a, S: SpeechSynthesizer> ReelPipeline<'a, S> {
    pub fn new(settings: &'a Settings, synthesizer: S) -> Result<Self, ReelError> {
        let work = tempfile::Builder::new()
            .prefix("synoid_reel_")
            .tempdir()
            .map_err(ReelError::Workspace)?;
        for sub in ["frames", "audio", "segments"] {
            std::fs::create_dir_all(work.path().join(sub)).map_err(ReelError::Workspace)?;
        }
        info!("[PIPELINE] Working directory {:?}", work.path());
        Ok(Self {
            settings,
            synthesizer,
            work,
        })
    }

    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    /// Health check, timeline, export.
    pub async fn run(&self, request: &ReelRequest) -> Result<ExportReport, ReelError> {
        health::ensure_encoder().await?;

        let timeline = self.build_timeline(request).await?;
        info!(
            "[PIPELINE] Timeline: {} segments, {:.2}s",
            timeline.len(),
            timeline.total_duration()
        );

        let params = ExportParams::new(&self.settings.video, &request.output);
        let report = exporter::export(&timeline, &params, &self.work.path().join("segments"))
            .await
            .map_err(|e| {
                error!("[PIPELINE] ❌ Export failed: {}", e);
                e
            })?;
        Ok(report)
    }

    /// Everything up to (not including) encoding.
    pub async fn build_timeline(&self, request: &ReelRequest) -> Result<Timeline, ReelError> {
        let jobs = plan_frames(
            request.questions.len(),
            &request.images,
            request.layout,
            &self.work.path().join("frames"),
        )?;
        let fallback = matches!(
            request.images,
            ImageSource::Files {
                placeholder_fallback: true,
                ..
            }
        );
        let (frames, background) = self.render_frames(jobs, fallback).await?;

        let hook_audio = self.narrate(&request.hook).await?;
        let mut question_audio = Vec::with_capacity(request.questions.len());
        for item in &request.questions {
            question_audio.push(self.narrate(item).await?);
        }

        let composer = Composer::new(self.settings, background);
        let hook = composer.hook(&request.hook, hook_audio)?;
        let questions = request
            .questions
            .iter()
            .zip(frames)
            .zip(question_audio)
            .map(|((item, frame), audio)| composer.question(item, frame, audio, request.layout))
            .collect::<Result<Vec<_>, _>>()?;

        let intro = request
            .theme
            .as_deref()
            .map(|theme| composer.intro(theme))
            .transpose()?;
        let outro = request
            .outro
            .as_deref()
            .map(|text| composer.outro(text))
            .transpose()?;

        let pause = build_pause(
            self.settings.timing.pause_duration,
            composer.background().clone(),
            request.sound_effect.as_deref(),
        );

        Ok(Timeline::assemble(intro, hook, questions, &pause, outro))
    }

    /// Question frames plus the shared background, rendered off the runtime.
    async fn render_frames(
        &self,
        jobs: Vec<FrameJob>,
        fallback: bool,
    ) -> Result<(Vec<FrameAsset>, FrameAsset), ReelError> {
        let renderer = FrameRenderer::new(&self.settings.video, fallback);
        let background_path = self.work.path().join("frames").join("background.png");

        let rendered = tokio::task::spawn_blocking(move || {
            let frames = renderer.render_all(&jobs)?;
            let background = renderer.background_frame(&background_path)?;
            Ok::<_, ImageError>((frames, background))
        })
        .await
        .map_err(|e| ImageError::Worker(e.to_string()))??;

        info!("[PIPELINE] ✅ {} frames ready", rendered.0.len());
        Ok(rendered)
    }

    async fn narrate(&self, item: &ContentItem) -> Result<AudioAsset, ReelError> {
        let output = self
            .work
            .path()
            .join("audio")
            .join(format!("{}.{}", item.stem(), self.synthesizer.file_extension()));

        info!("[VOICE] Synthesizing {}", item.label());
        match self.synthesizer.synthesize(&item.text, &output).await {
            Ok(asset) => {
                info!("[VOICE] ✅ {} ({:.2}s)", item.stem(), asset.duration);
                Ok(asset)
            }
            Err(e) => {
                error!("[VOICE] ❌ {}: {}", item.label(), e);
                Err(ReelError::synthesis(item.label(), e))
            }
        }
    }
}
