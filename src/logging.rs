// SYNOID Reel Logging
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Append-only writer for `log_file`, creating its directory if needed.
fn file_writer(log_file: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = log_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "synoid_reel.log".to_string());

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
}

/// Install the global subscriber: stderr plus an append-only log file.
///
/// `RUST_LOG` overrides the default `info` filter. Keep the returned guard
/// alive until exit or buffered file lines are lost. Fails if the log file
/// cannot be opened.
pub fn init_tracing(log_file: &Path) -> Result<WorkerGuard, InitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, guard) = tracing_appender::non_blocking(file_writer(log_file)?);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_file_is_created_with_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs").join("reel.log");
        let mut writer = file_writer(&log).unwrap();
        writer.write_all(b"line\n").unwrap();
        writer.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "line\n");
    }

    #[test]
    fn test_log_dir_that_is_a_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();
        assert!(file_writer(&blocker.join("reel.log")).is_err());
    }
}
