// SYNOID Reel Studio
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Frame, voice, segment and export stages of the quiz reel pipeline.

pub mod composer;
pub mod exporter;
pub mod health;
pub mod image_tools;
pub mod pause;
pub mod pipeline;
pub mod sequencer;
pub mod validation_gate;
pub mod video_stitcher;
pub mod voice;

pub use pipeline::{ImageSource, ReelPipeline, ReelRequest};

/// How question frames are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One letterboxed image per question.
    #[default]
    Single,
    /// Two square images stacked with an "Or" between them.
    Pair,
}

impl Layout {
    pub fn images_per_question(&self) -> usize {
        match self {
            Layout::Single => 1,
            Layout::Pair => 2,
        }
    }
}
