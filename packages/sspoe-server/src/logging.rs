//! Tracing setup for the server and the player core.
//!
//! A bare level such as `debug` applies to this workspace's crates and to
//! request tracing; every other crate stays at `warn`. Full directives
//! (anything containing `=`) are used as given.

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub const LOG_FILE_PREFIX: &str = "sspoe-server.log";

const DEFAULT_LEVEL: &str = "info";
const SCOPED_TARGETS: [&str; 3] = ["sspoe_server", "sspoe_core", "tower_http"];

pub struct FileLogGuard {
    _guard: WorkerGuard,
}

pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') {
        return level.to_string();
    }

    let level = if level.is_empty() { DEFAULT_LEVEL } else { level };
    let mut directives = vec!["warn".to_string()];
    directives.extend(SCOPED_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

fn file_writer(log_dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file logs are lost.
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(filter_directives(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(DEFAULT_LEVEL)));
    let stdout_layer = fmt::layer().with_target(true);

    let (file_layer, guard) = match config.log_dir.as_deref().map(|dir| (dir, file_writer(dir))) {
        Some((_, Ok((writer, guard)))) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(FileLogGuard { _guard: guard }))
        }
        Some((dir, Err(err))) => {
            eprintln!("file logging disabled, cannot use {}: {err}", dir.display());
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}
