// SYNOID Reel Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Loads the JSON settings document and the two ordered content documents
// (questions, hooks). Raw documents deserialize into all-optional structs and
// are validated into an immutable `Settings`; nothing downstream ever sees an
// unvalidated value.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::Rgb;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;

pub const DEFAULT_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB";
pub const DEFAULT_MODEL_ID: &str = "eleven_monolingual_v1";
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

// ─────────────────────────────────────────────────────────────────────────────
// Validated settings
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Settings {
    pub video: VideoSettings,
    pub timing: TimingSettings,
    pub voice: VoiceSettings,
    pub output: OutputSettings,
    pub cards: CardSettings,
}

#[derive(Debug, Clone)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub text_font_size: u32,
    pub text_color: Rgb<u8>,
    pub text_stroke_color: Rgb<u8>,
    pub text_stroke_width: u32,
    /// TrueType font handed to drawtext; fontconfig default when unset.
    pub font_path: Option<PathBuf>,
    /// Brand background for hook, pause and card segments.
    pub background_color: Rgb<u8>,
    /// Letterbox fill around normalized images.
    pub fill_color: Rgb<u8>,
    /// Placeholder label ink.
    pub label_color: Rgb<u8>,
}

#[derive(Debug, Clone)]
pub struct TimingSettings {
    pub question_duration: f64,
    pub pause_duration: f64,
    pub hook_duration: f64,
    pub intro_duration: f64,
    pub outro_duration: f64,
}

#[derive(Clone)]
pub struct VoiceSettings {
    pub voice_id: String,
    pub api_key: String,
    pub model_id: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for VoiceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceSettings")
            .field("voice_id", &self.voice_id)
            .field("api_key", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub output_dir: PathBuf,
    pub output_filename: String,
}

impl OutputSettings {
    pub fn default_output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }
}

#[derive(Debug, Clone)]
pub struct CardSettings {
    pub intro_title: String,
    pub outro_text: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw document shape
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    video_settings: RawVideo,
    #[serde(default)]
    timing_settings: RawTiming,
    voice_settings: Option<RawVoice>,
    #[serde(default)]
    output_settings: RawOutput,
    #[serde(default)]
    card_settings: RawCards,
}

#[derive(Debug, Default, Deserialize)]
struct RawVideo {
    width: Option<i64>,
    height: Option<i64>,
    fps: Option<i64>,
    text_font_size: Option<i64>,
    text_color: Option<String>,
    text_stroke_color: Option<String>,
    text_stroke_width: Option<i64>,
    font_path: Option<PathBuf>,
    background_color: Option<String>,
    fill_color: Option<String>,
    label_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTiming {
    question_duration: Option<f64>,
    pause_duration: Option<f64>,
    hook_duration: Option<f64>,
    intro_duration: Option<f64>,
    outro_duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVoice {
    voice_id: Option<String>,
    api_key: Option<String>,
    model_id: Option<String>,
    base_url: Option<String>,
    request_timeout_secs: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    output_dir: Option<PathBuf>,
    output_filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCards {
    intro_title: Option<String>,
    outro_text: Option<String>,
}

fn positive_int(field: &'static str, value: Option<i64>, default: u32) -> Result<u32, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) if v > 0 && v <= u32::MAX as i64 => Ok(v as u32),
        Some(v) => Err(ConfigError::NonPositive {
            field,
            value: v as f64,
        }),
    }
}

/// Frame dimensions feed a yuv420p encode, which needs both sides even.
fn even_dimension(field: &'static str, value: Option<i64>, default: u32) -> Result<u32, ConfigError> {
    let v = positive_int(field, value, default)?;
    if v % 2 != 0 {
        return Err(ConfigError::OddDimension { field, value: v });
    }
    Ok(v)
}

fn non_negative_int(field: &'static str, value: Option<i64>, default: u32) -> Result<u32, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) if (0..=u32::MAX as i64).contains(&v) => Ok(v as u32),
        Some(v) => Err(ConfigError::Negative { field, value: v }),
    }
}

fn positive_secs(field: &'static str, value: Option<f64>, default: f64) -> Result<f64, ConfigError> {
    let v = value.unwrap_or(default);
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ConfigError::NonPositive { field, value: v })
    }
}

fn color(field: &'static str, value: Option<&str>, default: &str) -> Result<Rgb<u8>, ConfigError> {
    let raw = value.unwrap_or(default);
    parse_color(raw).ok_or_else(|| ConfigError::InvalidColor {
        field,
        value: raw.to_string(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn validate_video(v: RawVideo) -> Result<VideoSettings, ConfigError> {
    Ok(VideoSettings {
        width: even_dimension("video_settings.width", v.width, 1080)?,
        height: even_dimension("video_settings.height", v.height, 1920)?,
        fps: positive_int("video_settings.fps", v.fps, 30)?,
        text_font_size: positive_int("video_settings.text_font_size", v.text_font_size, 80)?,
        text_color: color("video_settings.text_color", v.text_color.as_deref(), "white")?,
        text_stroke_color: color(
            "video_settings.text_stroke_color",
            v.text_stroke_color.as_deref(),
            "black",
        )?,
        text_stroke_width: non_negative_int(
            "video_settings.text_stroke_width",
            v.text_stroke_width,
            3,
        )?,
        font_path: v.font_path,
        background_color: color(
            "video_settings.background_color",
            v.background_color.as_deref(),
            "#dfe3fd",
        )?,
        fill_color: color("video_settings.fill_color", v.fill_color.as_deref(), "#000000")?,
        label_color: color("video_settings.label_color", v.label_color.as_deref(), "#323250")?,
    })
}

impl Settings {
    /// Read and validate a settings document from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(&text, path)?;
        info!("[CONFIG] Settings loaded from {:?}", path);
        debug!("[CONFIG] {:?}", settings);
        Ok(settings)
    }

    /// Validate a settings document held in memory.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, Path::new("<inline>"))
    }

    fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, ConfigError> {
        let video = validate_video(raw.video_settings)?;

        let t = raw.timing_settings;
        let timing = TimingSettings {
            question_duration: positive_secs("timing_settings.question_duration", t.question_duration, 5.0)?,
            pause_duration: positive_secs("timing_settings.pause_duration", t.pause_duration, 2.0)?,
            hook_duration: positive_secs("timing_settings.hook_duration", t.hook_duration, 4.0)?,
            intro_duration: positive_secs("timing_settings.intro_duration", t.intro_duration, 2.8)?,
            outro_duration: positive_secs("timing_settings.outro_duration", t.outro_duration, 2.4)?,
        };

        let raw_voice = raw
            .voice_settings
            .ok_or(ConfigError::MissingField("voice_settings"))?;
        let voice = VoiceSettings {
            api_key: non_blank(raw_voice.api_key)
                .ok_or(ConfigError::MissingField("voice_settings.api_key"))?,
            voice_id: non_blank(raw_voice.voice_id).unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            model_id: non_blank(raw_voice.model_id).unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            base_url: non_blank(raw_voice.base_url)
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(u64::from(positive_int(
                "voice_settings.request_timeout_secs",
                raw_voice.request_timeout_secs,
                30,
            )?)),
        };

        let o = raw.output_settings;
        let output = OutputSettings {
            output_dir: o.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            output_filename: non_blank(o.output_filename).unwrap_or_else(|| "quiz_video.mp4".to_string()),
        };

        let c = raw.card_settings;
        let cards = CardSettings {
            intro_title: non_blank(c.intro_title).unwrap_or_else(|| "Couples Quiz!".to_string()),
            outro_text: non_blank(c.outro_text),
        };

        Ok(Self {
            video,
            timing,
            voice,
            output,
            cards,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawVideoDocument {
    #[serde(default)]
    video_settings: RawVideo,
}

/// Only the `video_settings` section of a settings document, for commands
/// that never reach the voice service. A missing document yields defaults.
pub fn load_video_settings(path: &Path) -> Result<VideoSettings, ConfigError> {
    if !path.exists() {
        info!("[CONFIG] {:?} not found; using default video settings", path);
        return validate_video(RawVideo::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawVideoDocument = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_video(raw.video_settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Colors
// ─────────────────────────────────────────────────────────────────────────────

/// Parse `#rgb`, `#rrggbb`, `0xrrggbb` or a basic color name.
pub fn parse_color(value: &str) -> Option<Rgb<u8>> {
    let v = value.trim().to_ascii_lowercase();
    let named = match v.as_str() {
        "black" => Some([0, 0, 0]),
        "white" => Some([255, 255, 255]),
        "red" => Some([255, 0, 0]),
        "green" => Some([0, 128, 0]),
        "blue" => Some([0, 0, 255]),
        "yellow" => Some([255, 255, 0]),
        "gray" | "grey" => Some([128, 128, 128]),
        "orange" => Some([255, 165, 0]),
        "purple" => Some([128, 0, 128]),
        "pink" => Some([255, 192, 203]),
        _ => None,
    };
    if let Some(rgb) = named {
        return Some(Rgb(rgb));
    }

    let hex = v.strip_prefix('#').or_else(|| v.strip_prefix("0x"))?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// `0xRRGGBB`, the form ffmpeg color options accept.
pub fn ffmpeg_color(rgb: Rgb<u8>) -> String {
    format!("0x{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

// ─────────────────────────────────────────────────────────────────────────────
// Content documents
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Hook,
    Question,
}

/// One line of narration, tagged with its position in its source document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    pub kind: ItemKind,
    pub index: usize,
    pub text: String,
}

impl ContentItem {
    pub fn new(kind: ItemKind, index: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            text: text.into(),
        }
    }

    /// Human-readable identity used in logs and errors.
    pub fn label(&self) -> String {
        let kind = match self.kind {
            ItemKind::Hook => "hook",
            ItemKind::Question => "question",
        };
        format!("{} {} (\"{}\")", kind, self.index + 1, self.text)
    }

    /// File stem for artifacts derived from this item.
    pub fn stem(&self) -> String {
        match self.kind {
            ItemKind::Hook => format!("hook_{}", self.index + 1),
            ItemKind::Question => format!("question_{}", self.index + 1),
        }
    }
}

/// Load an ordered list of non-empty strings. An empty list is allowed here;
/// callers decide whether that is acceptable.
pub fn load_content(path: &Path, kind: ItemKind) -> Result<Vec<ContentItem>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let lines: Vec<String> = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                Err(ConfigError::EmptyItem {
                    path: path.to_path_buf(),
                    index,
                })
            } else {
                Ok(ContentItem::new(kind, index, trimmed))
            }
        })
        .collect()
}

/// Questions must contain at least one item.
pub fn load_questions(path: &Path) -> Result<Vec<ContentItem>, ConfigError> {
    let questions = load_content(path, ItemKind::Question)?;
    if questions.is_empty() {
        return Err(ConfigError::NoQuestions(path.to_path_buf()));
    }
    info!("[CONFIG] Loaded {} questions from {:?}", questions.len(), path);
    Ok(questions)
}

/// Pick the hook for this run: an explicit override wins, otherwise the
/// `index`-th entry of the hooks document.
pub fn select_hook(
    hooks: &[ContentItem],
    override_text: Option<&str>,
    index: usize,
    hooks_path: &Path,
) -> Result<ContentItem, ConfigError> {
    if let Some(text) = override_text.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(ContentItem::new(ItemKind::Hook, 0, text));
    }
    if hooks.is_empty() {
        return Err(ConfigError::NoHook(hooks_path.to_path_buf()));
    }
    hooks
        .get(index)
        .cloned()
        .ok_or(ConfigError::HookIndexOutOfRange {
            index,
            available: hooks.len(),
        })
}

/// Load the hooks document only when no usable override is given, then
/// select. A blank `--hook` counts as no override.
pub fn resolve_hook(
    hooks_path: &Path,
    override_text: Option<&str>,
    index: usize,
) -> Result<ContentItem, ConfigError> {
    let override_text = override_text.map(str::trim).filter(|t| !t.is_empty());
    let hooks = match override_text {
        Some(_) => Vec::new(),
        None => load_content(hooks_path, ItemKind::Hook)?,
    };
    select_hook(&hooks, override_text, index, hooks_path)
}
