// SYNOID Reel Audio Probe
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Duration is measured by decoding every packet, never read from container
// metadata: TTS responses are streamed MP3 and often carry no usable header.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::SynthesisError;

fn decode_err(path: &Path, reason: impl ToString) -> SynthesisError {
    SynthesisError::Decode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Decoded length of the first audio track in seconds.
pub fn decoded_duration(path: &Path) -> Result<f64, SynthesisError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| decode_err(path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_err(path, "no audio track"))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_err(path, e))?;

    let mut frames: u64 = 0;
    let mut sample_rate: Option<u32> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_err(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(buffer) => {
                sample_rate.get_or_insert(buffer.spec().rate);
                frames += buffer.frames() as u64;
            }
            // Corrupt frames are skipped, not fatal.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(decode_err(path, e)),
        }
    }

    let rate = sample_rate.ok_or_else(|| decode_err(path, "no decodable frames"))?;
    let duration = frames as f64 / f64::from(rate);
    if duration <= 0.0 {
        return Err(decode_err(path, "zero-length waveform"));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(matches!(
            decoded_duration(&path),
            Err(SynthesisError::Decode { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            decoded_duration(Path::new("__missing_tts_output.mp3")),
            Err(SynthesisError::Io(_))
        ));
    }
}
