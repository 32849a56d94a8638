use std::path::Path;

use anyhow::{Context, Result};
use babel_core::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// The terminal only shows warnings unless `RUST_LOG` says otherwise. The
/// daily log file under `logs_dir` follows `[logging].filter`. Keep the
/// returned guard alive until exit or buffered file output is lost.
pub fn init(config: &LoggingConfig, logs_dir: &Path) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::WARN.into()));
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file_layer, guard) = if config.file {
        std::fs::create_dir_all(logs_dir)
            .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;
        let file_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .with_context(|| format!("Invalid log filter '{}'", config.filter))?;

        let appender = tracing_appender::rolling::daily(logs_dir, "babel.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .with_filter(file_filter);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
