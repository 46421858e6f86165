// SYNOID Reel Clip Composer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// A segment is a description, not pixels: one still frame, an optional audio
// source, caption render instructions and a resolved duration. The exporter
// turns descriptions into encoded clips.

use std::path::PathBuf;

use image::Rgb;

use super::image_tools::{FrameAsset, PairLayout};
use super::voice::AudioAsset;
use super::Layout;
use crate::config::{ContentItem, Settings, VideoSettings};
use crate::error::CompositionError;

/// Seconds of caption fade-in and fade-out.
pub const CAPTION_FADE: f64 = 0.4;

/// Average glyph advance as a fraction of font size, used for wrapping.
const GLYPH_WIDTH_RATIO: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Intro,
    Hook,
    Question(usize),
    Pause,
    Outro,
}

impl SegmentKind {
    pub fn label(&self) -> String {
        match self {
            SegmentKind::Intro => "intro".to_string(),
            SegmentKind::Hook => "hook".to_string(),
            SegmentKind::Question(i) => format!("question {}", i + 1),
            SegmentKind::Pause => "pause".to_string(),
            SegmentKind::Outro => "outro".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Synthesized narration; defines the segment length.
    Speech(AudioAsset),
    /// Sound effect looped or trimmed to the segment length.
    Loop(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    pub font_size: u32,
    pub color: Rgb<u8>,
    pub stroke_color: Rgb<u8>,
    pub stroke_width: u32,
    pub font_path: Option<PathBuf>,
}

impl CaptionStyle {
    pub fn from_settings(video: &VideoSettings) -> Self {
        Self {
            font_size: video.text_font_size,
            color: video.text_color,
            stroke_color: video.text_stroke_color,
            stroke_width: video.text_stroke_width,
            font_path: video.font_path.clone(),
        }
    }

    /// Same style at `percent`% of the base font size.
    pub fn scaled(&self, percent: u32) -> Self {
        Self {
            font_size: (self.font_size * percent / 100).max(1),
            ..self.clone()
        }
    }
}

/// Vertical anchor; captions are always horizontally centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionPosition {
    Center,
    Top(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub lines: Vec<String>,
    pub style: CaptionStyle,
    pub position: CaptionPosition,
    pub fade: bool,
}

impl Caption {
    pub fn new(text: &str, style: CaptionStyle, max_width: u32, position: CaptionPosition) -> Self {
        Self {
            lines: wrap_text(text, max_width, style.font_size),
            style,
            position,
            fade: true,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Greedy word wrap against an estimated glyph width. A single word longer
/// than the line stays on its own line.
pub fn wrap_text(text: &str, max_width: u32, font_size: u32) -> Vec<String> {
    let glyph = (font_size as f64 * GLYPH_WIDTH_RATIO).max(1.0);
    let max_chars = ((max_width as f64 / glyph).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub frame: FrameAsset,
    pub audio: Option<AudioSource>,
    pub captions: Vec<Caption>,
    pub duration: f64,
}

impl Segment {
    pub fn speech(&self) -> Option<&AudioAsset> {
        match &self.audio {
            Some(AudioSource::Speech(asset)) => Some(asset),
            _ => None,
        }
    }
}

/// Resolve a segment's duration: the narration length when present,
/// otherwise `fallback_duration`.
pub fn compose_segment(
    kind: SegmentKind,
    frame: FrameAsset,
    audio: Option<AudioAsset>,
    captions: Vec<Caption>,
    fallback_duration: f64,
) -> Result<Segment, CompositionError> {
    let duration = audio.as_ref().map_or(fallback_duration, |a| a.duration);
    if !duration.is_finite() || duration <= 0.0 {
        return Err(CompositionError::InvalidDuration {
            segment: kind.label(),
            duration,
        });
    }
    Ok(Segment {
        kind,
        frame,
        audio: audio.map(AudioSource::Speech),
        captions,
        duration,
    })
}

/// Builds the standard segment kinds from settings.
pub struct Composer<'a> {
    settings: &'a Settings,
    background: FrameAsset,
    style: CaptionStyle,
}

impl<'a> Composer<'a> {
    pub fn new(settings: &'a Settings, background: FrameAsset) -> Self {
        Self {
            settings,
            background,
            style: CaptionStyle::from_settings(&settings.video),
        }
    }

    pub fn background(&self) -> &FrameAsset {
        &self.background
    }

    fn width(&self) -> u32 {
        self.settings.video.width
    }

    fn height(&self) -> u32 {
        self.settings.video.height
    }

    /// Caption width for full-bleed cards (90% of the frame).
    fn card_text_width(&self) -> u32 {
        self.width() * 9 / 10
    }

    /// Scale a y coordinate laid out for a 1920px-tall frame.
    fn rows(&self, y_at_1920: u32) -> u32 {
        (u64::from(y_at_1920) * u64::from(self.height()) / 1920) as u32
    }

    pub fn hook(&self, item: &ContentItem, audio: AudioAsset) -> Result<Segment, CompositionError> {
        let caption = Caption::new(
            &item.text,
            self.style.clone(),
            self.card_text_width(),
            CaptionPosition::Center,
        );
        compose_segment(
            SegmentKind::Hook,
            self.background.clone(),
            Some(audio),
            vec![caption],
            self.settings.timing.hook_duration,
        )
    }

    pub fn question(
        &self,
        item: &ContentItem,
        frame: FrameAsset,
        audio: AudioAsset,
        layout: Layout,
    ) -> Result<Segment, CompositionError> {
        let margin = self.width() / 12;
        let max_width = self.width() - 2 * margin;
        let pair = PairLayout::compute(self.width(), self.height(), self.style.font_size);

        let mut captions = vec![Caption::new(
            &item.text,
            self.style.scaled(110),
            max_width,
            CaptionPosition::Top(pair.caption_y),
        )];
        if layout == Layout::Pair {
            captions.push(Caption::new(
                "Or",
                self.style.scaled(90),
                max_width,
                CaptionPosition::Top(pair.or_y),
            ));
        }

        compose_segment(
            SegmentKind::Question(item.index),
            frame,
            Some(audio),
            captions,
            self.settings.timing.question_duration,
        )
    }

    /// Silent title card: "<intro title>", "Today's theme is:", "<theme>".
    pub fn intro(&self, theme: &str) -> Result<Segment, CompositionError> {
        let width = self.card_text_width();
        let captions = vec![
            Caption::new(
                &self.settings.cards.intro_title,
                self.style.scaled(120),
                width,
                CaptionPosition::Top(self.rows(220)),
            ),
            Caption::new(
                "Today's theme is:",
                self.style.clone(),
                width,
                CaptionPosition::Top(self.rows(420)),
            ),
            Caption::new(theme, self.style.scaled(110), width, CaptionPosition::Top(self.rows(560))),
        ];
        compose_segment(
            SegmentKind::Intro,
            self.background.clone(),
            None,
            captions,
            self.settings.timing.intro_duration,
        )
    }

    /// Silent closing card.
    pub fn outro(&self, text: &str) -> Result<Segment, CompositionError> {
        let caption = Caption::new(
            text,
            self.style.scaled(105),
            self.card_text_width(),
            CaptionPosition::Center,
        );
        compose_segment(
            SegmentKind::Outro,
            self.background.clone(),
            None,
            vec![caption],
            self.settings.timing.outro_duration,
        )
    }
}
