// SYNOID Reel Dependency Health Check
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use tokio::process::Command;
use tracing::{info, warn};

use crate::error::ExportError;

/// External binaries the export stage shells out to. Durations are decoded
/// in-process, so ffprobe is not needed.
pub const REQUIRED_TOOLS: [&str; 1] = ["ffmpeg"];

async fn is_runnable(tool: &str) -> bool {
    match Command::new(tool).arg("-version").output().await {
        Ok(out) => out.status.success(),
        Err(_) => false,
    }
}

/// Names of required tools that cannot be executed.
pub async fn missing_tools() -> Vec<&'static str> {
    let mut missing = Vec::new();
    for tool in REQUIRED_TOOLS {
        if is_runnable(tool).await {
            info!("[HEALTH] {} ✅", tool);
        } else {
            warn!("[HEALTH] {} not found on PATH", tool);
            missing.push(tool);
        }
    }
    missing
}

/// Fail before any network call if the encoder toolchain is absent.
pub async fn ensure_encoder() -> Result<(), ExportError> {
    let missing = missing_tools().await;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ExportError::EncoderUnavailable(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_binary_is_not_runnable() {
        assert!(!is_runnable("__synoid_reel_no_such_tool").await);
    }

    #[test]
    fn test_only_the_encoder_is_required() {
        assert_eq!(REQUIRED_TOOLS, ["ffmpeg"]);
        assert!(!REQUIRED_TOOLS.contains(&"ffprobe"));
    }

    #[tokio::test]
    async fn test_missing_tools_is_subset_of_required() {
        let missing = missing_tools().await;
        assert!(missing.iter().all(|t| REQUIRED_TOOLS.contains(t)));
        assert_eq!(ensure_encoder().await.is_ok(), missing.is_empty());
    }
}
