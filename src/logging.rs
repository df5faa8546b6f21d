use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Stdout plus a daily rolling file under `log_dir`.
///
/// `RUST_LOG` overrides the default `info` filter. Keep the returned guard
/// alive for the whole process or buffered file lines are lost. A second call
/// keeps the subscriber already installed.
pub fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("revenue-etl")
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("failed to open log directory {}", log_dir.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init();

    if let Err(e) = installed {
        debug!(error = %e, log_dir = %log_dir.display(), "Tracing already initialised, keeping existing subscriber");
    }

    Ok(guard)
}
