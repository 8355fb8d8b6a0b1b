//! Console logging, plus a daily rolling file log in release builds.

#[cfg(any(test, not(debug_assertions)))]
use std::{
    path::Path,
    time::{Duration, SystemTime},
};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log files untouched for longer than this are removed at startup.
#[cfg(not(debug_assertions))]
const LOG_RETENTION: Duration = Duration::from_secs(60 * 60 * 24 * 30);

/// Installs the global subscriber. The returned guard flushes the file log
/// when dropped, so it must live until the process exits.
pub fn init() -> anyhow::Result<Option<WorkerGuard>> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(tracing::Level::TRACE)
        .with_target(false)
        .with_env_filter(env_filter())
        .finish();

    #[cfg(debug_assertions)]
    let guard = {
        tracing::subscriber::set_global_default(subscriber)?;
        None
    };

    #[cfg(not(debug_assertions))]
    let guard = {
        use anyhow::Context;
        use tracing_subscriber::layer::SubscriberExt;

        let logs_dir = dirs::data_dir()
            .context("Failed to get $data_dir path")?
            .join("tray-menu")
            .join("logs");

        let removed = remove_stale_logs(&logs_dir, LOG_RETENTION);

        let appender = tracing_appender::rolling::daily(&logs_dir, "tray-menu.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::Layer::default()
            .with_ansi(false)
            .with_writer(writer);

        tracing::subscriber::set_global_default(subscriber.with(file_layer))?;
        tracing::debug!("Removed {removed} stale log files from {}", logs_dir.display());
        Some(guard)
    };

    tracing::debug!("Initialized Logger");
    Ok(guard)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("TRAY_MENU_LOG").unwrap_or_else(|_| {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::DEBUG.into())
            .from_env_lossy()
    })
}

/// Removes regular files in `dir` last modified more than `max_age` ago and
/// returns how many were removed. A missing directory has nothing to remove.
#[cfg(any(test, not(debug_assertions)))]
fn remove_stale_logs(dir: &Path, max_age: Duration) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    let now = SystemTime::now();
    let is_stale = |metadata: std::fs::Metadata| {
        metadata.is_file()
            && metadata
                .modified()
                .is_ok_and(|modified| now.duration_since(modified).unwrap_or_default() > max_age)
    };

    entries
        .flatten()
        .filter(|entry| entry.metadata().is_ok_and(is_stale))
        .filter(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to remove {}: {e}", entry.path().display());
                false
            }
        })
        .count()
}
