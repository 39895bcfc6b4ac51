// Logging setup: console plus an append-mode run log

use anyhow::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

struct LogTimer;

impl FormatTime for LogTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Install the global subscriber: human output on stdout and, when the log
/// file can be opened, a plain-text copy appended to it. A log file that
/// cannot be opened degrades to console-only logging rather than aborting.
pub fn init(log_file: &Path) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_target(false)
        .with_timer(LogTimer)
        .with_writer(std::io::stdout);

    let file_layer = match open_log_file(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_timer(LogTimer)
                .with_writer(Arc::new(file)),
        ),
        Err(e) => {
            eprintln!(
                "Warning: could not open log file {}: {e}; logging to console only",
                log_file.display()
            );
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(())
}

fn open_log_file(log_file: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_file)
}
