// SYNOID Reel Pause Builder
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::Path;

use tracing::{info, warn};

use super::composer::{AudioSource, Segment, SegmentKind};
use super::image_tools::FrameAsset;

/// Filler between questions: brand background, no caption, optional sound
/// effect looped or trimmed to `duration`. A missing effect file degrades to
/// silence.
pub fn build_pause(duration: f64, background: FrameAsset, sound_effect: Option<&Path>) -> Segment {
    let audio = match sound_effect {
        Some(path) if path.is_file() => {
            info!("[PAUSE] Looping {:?} over {:.2}s pauses", path, duration);
            Some(AudioSource::Loop(path.to_path_buf()))
        }
        Some(path) => {
            warn!("[PAUSE] Sound effect {:?} not found; pauses will be silent", path);
            None
        }
        None => None,
    };

    Segment {
        kind: SegmentKind::Pause,
        frame: background,
        audio,
        captions: Vec::new(),
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn bg() -> FrameAsset {
        FrameAsset {
            path: PathBuf::from("/tmp/bg.png"),
            width: 1080,
            height: 1920,
        }
    }

    #[test]
    fn test_missing_effect_degrades_to_silence() {
        let pause = build_pause(2.0, bg(), Some(Path::new("__no_such_clock.mp3")));
        assert_eq!(pause.kind, SegmentKind::Pause);
        assert_eq!(pause.duration, 2.0);
        assert!(pause.audio.is_none());
        assert!(pause.captions.is_empty());
    }

    #[test]
    fn test_existing_effect_is_looped() {
        let dir = tempfile::tempdir().unwrap();
        let clock = dir.path().join("clock.wav");
        std::fs::write(&clock, b"RIFF").unwrap();
        let pause = build_pause(3.5, bg(), Some(&clock));
        assert_eq!(pause.audio, Some(AudioSource::Loop(clock)));
        assert_eq!(pause.duration, 3.5);
    }
}
