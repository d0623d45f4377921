//! Log subscriber construction.
//!
//! Nothing here installs a process-wide logger. The caller builds a subscriber
//! from an explicit `LogConfig` and scopes it with
//! `tracing::subscriber::with_default`, so library code and tests stay
//! independent of whatever the binary configured.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::{fmt, Layer as _};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const MAX_ROTATED_FILES: usize = 5;

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Threshold for events printed to stderr.
    pub console_level: LevelFilter,
    /// Optional log file, appended to.
    pub file: Option<PathBuf>,
    pub file_level: LevelFilter,
    /// Rotate the log file once it reaches this many bytes. 0 disables.
    pub max_file_size: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::ERROR,
            file: None,
            file_level: LevelFilter::DEBUG,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Build the subscriber. When a log file is configured the returned guard
/// owns its background writer: keep it alive for as long as the subscriber
/// is in use, and drop it to flush.
pub fn subscriber(
    config: &LogConfig,
) -> io::Result<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>)> {
    let (file_writer, guard) = match &config.file {
        Some(path) => {
            let file = rotating_file(path, config.max_file_size)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let console = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(config.console_level);
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(config.file_level)
    });

    Ok((tracing_subscriber::registry().with(console).with(file_layer), guard))
}

/// `app.log` rotates to `app.log.1`, `app.log.2`, ... keeping the newest
/// `MAX_ROTATED_FILES`.
fn rotating_file(path: &Path, max_size: u64) -> io::Result<FileRotate<AppendCount>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let limit = match usize::try_from(max_size) {
        Ok(0) | Err(_) => ContentLimit::None,
        Ok(bytes) => ContentLimit::Bytes(bytes),
    };
    Ok(FileRotate::new(
        path,
        AppendCount::new(MAX_ROTATED_FILES),
        limit,
        Compression::None,
        #[cfg(unix)]
        None,
    ))
}
