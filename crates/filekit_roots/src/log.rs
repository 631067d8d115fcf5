use std::path::PathBuf;

use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs a JSON subscriber that writes to a daily rolling file in
/// `log_dir`. The filter comes from `FILEKIT_LOG`, falling back to
/// `filekit=debug`.
///
/// Logs are flushed while the returned guard is alive.
pub fn init_tracing(log_dir: PathBuf) -> anyhow::Result<Guard> {
    let appender = tracing_appender::rolling::daily(&log_dir, "filekit.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_env("FILEKIT_LOG")
                .unwrap_or_else(|_| EnvFilter::new("filekit=debug")),
        )
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_thread_ids(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    debug!(path = %log_dir.display(), "JSON logging initialized");
    Ok(Guard(guard))
}

pub struct Guard(#[allow(dead_code)] WorkerGuard);
