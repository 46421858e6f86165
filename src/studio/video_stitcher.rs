// SYNOID Reel Video Stitcher — Lossless Segment Concatenation
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Rendered segments share codec, resolution, frame rate and audio layout, so
// FFmpeg's concat demuxer can join them with `-c copy`: no second encode.

use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info};

use crate::error::ExportError;

pub struct VideoStitcher;

impl VideoStitcher {
    /// Build the contents of an FFmpeg concat manifest.
    ///
    /// Each line is `file '<path>'`; embedded single quotes are escaped the
    /// way the concat demuxer expects.
    pub fn create_concat_manifest(segments: &[PathBuf]) -> String {
        segments
            .iter()
            .map(|p| format!("file '{}'", p.to_string_lossy().replace('\'', r"'\''")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the manifest into `work_dir` and join the segments into
    /// `output_path`.
    pub async fn finalize(
        segments: &[PathBuf],
        work_dir: &Path,
        output_path: &Path,
    ) -> Result<PathBuf, ExportError> {
        if segments.is_empty() {
            return Err(ExportError::NoSegments);
        }

        let manifest_path = work_dir.join("concat_manifest.txt");
        tokio::fs::write(&manifest_path, Self::create_concat_manifest(segments)).await?;

        info!(
            "[STITCHER] Manifest written ({} segments): {:?}",
            segments.len(),
            manifest_path
        );

        let output = Command::new("ffmpeg")
            .args(["-y", "-v", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(&manifest_path)
            .args(["-c", "copy", "-movflags", "+faststart"])
            .arg(output_path)
            .output()
            .await
            .map_err(|e| ExportError::Encoder {
                stage: "concat".to_string(),
                detail: e.to_string(),
            })?;

        let _ = tokio::fs::remove_file(&manifest_path).await;

        if output.status.success() {
            info!("[STITCHER] ✅ Final output: {:?}", output_path);
            Ok(output_path.to_path_buf())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("[STITCHER] ❌ FFmpeg concat failed: {}", stderr);
            Err(ExportError::Encoder {
                stage: "concat".to_string(),
                detail: stderr,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_manifest_generation() {
        let segments = vec![
            PathBuf::from("/tmp/seg_000.mp4"),
            PathBuf::from("/tmp/seg_001.mp4"),
            PathBuf::from("/tmp/seg_002.mp4"),
        ];
        let manifest = VideoStitcher::create_concat_manifest(&segments);
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "file '/tmp/seg_000.mp4'");
        assert!(lines[2].contains("seg_002.mp4"));
    }

    #[test]
    fn test_manifest_escapes_quotes() {
        let manifest = VideoStitcher::create_concat_manifest(&[PathBuf::from("/tmp/it's.mp4")]);
        assert_eq!(manifest, r"file '/tmp/it'\''s.mp4'");
    }

    #[tokio::test]
    async fn test_empty_segments() {
        assert!(VideoStitcher::create_concat_manifest(&[]).is_empty());
        let dir = std::env::temp_dir();
        let result = VideoStitcher::finalize(&[], &dir, &dir.join("never.mp4")).await;
        assert!(matches!(result, Err(ExportError::NoSegments)));
    }
}
