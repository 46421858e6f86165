// SYNOID Reel Validation Gate — Null-Decode Integrity Checker
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Performs a "Null Decode" pass on the exported reel: FFmpeg reads and decodes
// every packet but writes nothing. Any bitstream corruption surfaces as text
// on stderr.

use std::path::Path;
use tokio::process::Command;
use tracing::{error, info};

use crate::error::ExportError;

pub struct ValidationGate;

impl ValidationGate {
    /// Deep-stream integrity check on a media file.
    ///
    /// Succeeds only if FFmpeg decodes the whole file with zero complaints.
    pub async fn verify(path: &Path) -> Result<(), ExportError> {
        let output = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-f", "null", "-"])
            .output()
            .await
            .map_err(|e| {
                error!("[VALIDATION] Failed to spawn ffmpeg for verification: {}", e);
                ExportError::Encoder {
                    stage: "verification".to_string(),
                    detail: e.to_string(),
                }
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() && stderr.trim().is_empty() {
            info!(
                "[VALIDATION] ✅ Output verified: {:?}",
                path.file_name().unwrap_or_default()
            );
            Ok(())
        } else {
            error!("[VALIDATION] ❌ Corruption in {:?}: {}", path, stderr.trim());
            Err(ExportError::Encoder {
                stage: "verification".to_string(),
                detail: stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_verify_nonexistent_file() {
        let result = ValidationGate::verify(&PathBuf::from("__nonexistent_reel_xyz.mp4")).await;
        assert!(result.is_err(), "Non-existent file should fail validation");
    }
}
