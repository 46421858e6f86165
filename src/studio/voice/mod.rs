// SYNOID Reel Voice
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The only network boundary in the crate. Everything upstream of the export
// step talks to `SpeechSynthesizer`, so tests swap in a local fake.

pub mod audio_probe;
pub mod tts;

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::SynthesisError;

pub use audio_probe::decoded_duration;
pub use tts::ElevenLabsClient;

/// A synthesized waveform on disk and its decoded length in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub duration: f64,
}

pub trait SpeechSynthesizer: Send + Sync {
    /// Turn `text` into speech written at `output`; one attempt, no retries.
    fn synthesize(
        &self,
        text: &str,
        output: &Path,
    ) -> impl Future<Output = Result<AudioAsset, SynthesisError>> + Send;

    /// Extension of the files this synthesizer writes.
    fn file_extension(&self) -> &'static str {
        "mp3"
    }
}
