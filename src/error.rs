// SYNOID Reel Error Taxonomy
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// One enum per pipeline stage. Every stage is fail-fast; `ReelError` is what
// the orchestrator hands back to the binary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Settings or content documents are missing, malformed or out of range.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Required setting '{0}' is missing")]
    MissingField(&'static str),

    #[error("Setting '{field}' must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("Setting '{field}' must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },

    #[error("Setting '{field}' must be even for H.264 4:2:0 output, got {value}")]
    OddDimension { field: &'static str, value: u32 },

    #[error("Setting '{field}' has an unrecognised color '{value}'")]
    InvalidColor { field: &'static str, value: String },

    #[error("File not found: {0:?}")]
    MissingFile(PathBuf),

    #[error("No questions found in {0:?}")]
    NoQuestions(PathBuf),

    #[error("Item {index} in {path:?} is empty")]
    EmptyItem { path: PathBuf, index: usize },

    #[error("No hook available: {0:?} is empty and no --hook was given")]
    NoHook(PathBuf),

    #[error("Hook index {index} is out of range ({available} hooks loaded)")]
    HookIndexOutOfRange { index: usize, available: usize },

    #[error("Expected {expected} images for {questions} questions, got {supplied}")]
    ImageCountMismatch {
        questions: usize,
        expected: usize,
        supplied: usize,
    },

    #[error("No images supplied; pass --images or --create-placeholders")]
    NoImageSource,
}

/// An input image could not be turned into a frame.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Cannot decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image {0:?} has zero width or height")]
    Empty(PathBuf),

    #[error("Cannot write frame {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Frame worker failed: {0}")]
    Worker(String),
}

/// Failure at the text-to-speech boundary.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Cannot synthesize empty text")]
    EmptyText,

    #[error("TTS authentication failed: {0}")]
    Unauthorized(String),

    #[error("TTS quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("TTS service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("TTS request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("TTS service returned no audio")]
    EmptyAudio,

    #[error("Cannot decode synthesized audio {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Cannot store synthesized audio: {0}")]
    Io(#[from] io::Error),
}

/// A segment could not be given a valid duration.
#[derive(Error, Debug)]
pub enum CompositionError {
    #[error("Segment '{segment}' resolved to invalid duration {duration}")]
    InvalidDuration { segment: String, duration: f64 },
}

/// Rendering or writing the final video failed.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Timeline has no segments")]
    NoSegments,

    #[error("Segment {index} is {found_w}x{found_h}, expected {expected_w}x{expected_h}")]
    DimensionMismatch {
        index: usize,
        expected_w: u32,
        expected_h: u32,
        found_w: u32,
        found_h: u32,
    },

    #[error("Segment {index} has invalid duration {duration}")]
    InvalidDuration { index: usize, duration: f64 },

    #[error("Output path {path:?} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Required tool(s) not found on PATH: {0}")]
    EncoderUnavailable(String),

    #[error("FFmpeg {stage} failed: {detail}")]
    Encoder { stage: String, detail: String },

    #[error("Export I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Top-level error for a reel run.
#[derive(Error, Debug)]
pub enum ReelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Speech synthesis failed for {item}: {source}")]
    Synthesis {
        item: String,
        #[source]
        source: SynthesisError,
    },

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Cannot prepare working directory: {0}")]
    Workspace(#[source] io::Error),
}

impl ReelError {
    pub fn synthesis(item: impl Into<String>, source: SynthesisError) -> Self {
        Self::Synthesis {
            item: item.into(),
            source,
        }
    }
}
