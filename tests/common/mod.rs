// SYNOID Reel Test Support
// Copyright (c) 2026 Xing_The_Creator | SYNOID

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use synoid_reel::config::Settings;
use synoid_reel::error::SynthesisError;
use synoid_reel::studio::voice::{decoded_duration, AudioAsset, SpeechSynthesizer};

pub const SAMPLE_RATE: u32 = 16_000;

/// Mono 16-bit WAV of `seconds` of a quiet tone.
pub fn wav_bytes(seconds: f64) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = (seconds * SAMPLE_RATE as f64).round() as u32;
        for i in 0..frames {
            let t = i as f32 / SAMPLE_RATE as f32;
            let sample = (t * 440.0 * std::f32::consts::TAU).sin() * 2_000.0;
            writer.write_sample(sample as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Seconds of narration the fake voice produces for `text`.
pub fn spoken_length(text: &str) -> f64 {
    0.25 * text.split_whitespace().count() as f64
}

/// Offline stand-in for the TTS service: writes a WAV whose length depends on
/// the word count, then measures it the same way the real client does.
#[derive(Default)]
pub struct FakeVoice {
    pub calls: AtomicUsize,
    /// Texts containing this marker fail with an HTTP 500.
    pub fail_on: Option<&'static str>,
}

impl FakeVoice {
    pub fn failing_on(marker: &'static str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: Some(marker),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SpeechSynthesizer for &FakeVoice {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioAsset, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.is_some_and(|m| text.contains(m)) {
            return Err(SynthesisError::Http {
                status: 500,
                body: "voice offline".into(),
            });
        }
        tokio::fs::write(output, wav_bytes(spoken_length(text))).await?;
        Ok(AudioAsset {
            path: output.to_path_buf(),
            duration: decoded_duration(output)?,
        })
    }

    fn file_extension(&self) -> &'static str {
        "wav"
    }
}

/// Small frames keep the image and encode stages fast.
pub fn small_settings(extra_video: &str) -> Settings {
    Settings::from_json_str(&format!(
        r#"{{
            "video_settings": {{"width": 216, "height": 384, "fps": 24, "text_font_size": 24{extra_video}}},
            "timing_settings": {{"pause_duration": 1.5}},
            "voice_settings": {{"api_key": "sk-test"}}
        }}"#
    ))
    .unwrap()
}
