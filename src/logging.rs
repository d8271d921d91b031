//! Logging configuration.
//!
//! Logs go to stderr, or to a daily rolling file when a log directory is
//! configured.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Log level can be controlled via the `FACECROP_LOG` environment variable:
/// - `FACECROP_LOG=debug` for per-image scan statistics
/// - `FACECROP_LOG=info` for one line per detected face (default)
/// - `FACECROP_LOG=warn` for warnings and errors only
/// - `FACECROP_LOG=error` for errors only
pub fn init(log_dir: Option<&Path>) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_env("FACECROP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(log_dir) = log_dir else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to set tracing subscriber")?;
        return Ok(());
    };

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "facecrop.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the writer thread; keep it for the process lifetime.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .context("Failed to set tracing subscriber")?;

    tracing::info!("Logging initialized with file backend at {:?}", log_dir);
    Ok(())
}
