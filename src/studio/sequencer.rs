// SYNOID Reel Sequencer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Playback order: [intro] hook q1 pause q2 pause ... qN [outro].
// Pauses sit strictly between questions.

use super::composer::{Segment, SegmentKind};
use crate::error::ExportError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn assemble(
        intro: Option<Segment>,
        hook: Segment,
        questions: Vec<Segment>,
        pause: &Segment,
        outro: Option<Segment>,
    ) -> Self {
        let mut segments = Vec::with_capacity(questions.len() * 2 + 3);
        segments.extend(intro);
        segments.push(hook);
        for (i, question) in questions.into_iter().enumerate() {
            if i > 0 {
                segments.push(pause.clone());
            }
            segments.push(question);
        }
        segments.extend(outro);
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    pub fn count(&self, predicate: impl Fn(&SegmentKind) -> bool) -> usize {
        self.segments.iter().filter(|s| predicate(&s.kind)).count()
    }

    /// Every segment must be renderable at the target resolution.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), ExportError> {
        if self.segments.is_empty() {
            return Err(ExportError::NoSegments);
        }
        for (index, seg) in self.segments.iter().enumerate() {
            if (seg.frame.width, seg.frame.height) != (width, height) {
                return Err(ExportError::DimensionMismatch {
                    index,
                    expected_w: width,
                    expected_h: height,
                    found_w: seg.frame.width,
                    found_h: seg.frame.height,
                });
            }
            if !seg.duration.is_finite() || seg.duration <= 0.0 {
                return Err(ExportError::InvalidDuration {
                    index,
                    duration: seg.duration,
                });
            }
        }
        Ok(())
    }
}
