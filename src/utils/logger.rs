//! Logging initialization.
//!
//! Logs go to a file so they never interfere with the TUI. Each run gets its
//! own timestamped file, e.g. `logs/shell-tabs.2024-12-06-14-30-25.log`.
//!
//! The level comes from `RUST_LOG` when set, otherwise from the configured
//! default (`SHELL_TABS_LOG_LEVEL`, `info` unless overridden).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Create the log file for this run inside `log_dir`.
pub fn create_log_file(log_dir: &Path) -> anyhow::Result<(fs::File, PathBuf)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create logs directory: {}", log_dir.display()))?;

    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let log_path = log_dir.join(format!("shell-tabs.{}.log", timestamp));
    let log_file = fs::File::create(&log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
    Ok((log_file, log_path))
}

/// Install the global file subscriber. Returns the path of the log file.
pub fn init_logging(log_dir: &Path, default_level: &str) -> anyhow::Result<PathBuf> {
    let (log_file, log_path) = create_log_file(log_dir)?;

    // Use non-blocking writer to avoid blocking the TUI
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    // The writer must outlive every log call, so the guard lives for the whole process.
    std::mem::forget(guard);

    tracing::info!("Logging initialized - writing to {}", log_path.display());
    Ok(log_path)
}
