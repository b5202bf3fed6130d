use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; `debug` can be enabled
/// via the settings file, in which case `RUST_LOG` may override it.
/// With `log_file` set, output goes to that file instead of stderr.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // When debug logging is disabled we force `info` level regardless of the
    // `RUST_LOG` environment variable.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let mut file_error = None;
    let writer = match log_file.as_deref().map(file_appender) {
        Some(Ok(appender)) => Some(appender),
        Some(Err(err)) => {
            file_error = Some(err);
            None
        }
        None => None,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match writer {
        Some(appender) => builder
            .with_ansi(false)
            .with_writer(BoxMakeWriter::new(appender))
            .try_init(),
        None => builder.with_writer(BoxMakeWriter::new(std::io::stderr)).try_init(),
    };

    if installed.is_ok() {
        if let Some(err) = file_error {
            tracing::warn!(%err, "log file unavailable, logging to stderr");
        }
    }
}

fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(dir)?;
    Ok(appender)
}
