use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vmtest_core::api::LoggingConfig;

/// Installs the global subscriber. Logs go to stderr so stdout carries only
/// the test report. `RUST_LOG` takes precedence over `logging.level`.
///
/// The returned guard flushes the file writer and must outlive the run.
pub fn init(cfg: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .with_context(|| format!("invalid logging.level {:?}", cfg.level))?,
    };
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let Some(path) = &cfg.file else {
        tracing_subscriber::registry().with(filter).with(stderr).try_init()?;
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("logging.file has no file name: {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()?;
    Ok(Some(guard))
}
