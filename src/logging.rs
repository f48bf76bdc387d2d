use std::path::PathBuf;

/// Keeps the background log writer alive; drop it last.
#[derive(Debug, Default)]
pub struct LogGuard {
    #[cfg(feature = "debug-log")]
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "svgchat=debug,warn" } else { "warn" }
}

#[cfg(feature = "debug-log")]
mod inner {
    use super::{LogGuard, PathBuf, default_filter};
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    static LOG_PATH: std::sync::OnceLock<PathBuf> = std::sync::OnceLock::new();

    pub fn init(verbose: bool) -> LogGuard {
        let log_path = PathBuf::from("svgchat-debug.log");

        let file = match fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file: {e}");
                return LogGuard::default();
            }
        };

        let (non_blocking, guard) = tracing_appender::non_blocking(file);

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if verbose { "trace" } else { "debug" })
        });

        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("Failed to set tracing subscriber");
            return LogGuard::default();
        }

        LOG_PATH.set(log_path).ok();

        tracing::info!(filter = default_filter(verbose), "Debug logging initialized");

        LogGuard {
            _guard: Some(guard),
        }
    }

    pub fn log_file_path() -> Option<&'static PathBuf> {
        LOG_PATH.get()
    }
}

#[cfg(not(feature = "debug-log"))]
mod inner {
    use super::{LogGuard, PathBuf, default_filter};
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    pub fn init(verbose: bool) -> LogGuard {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false),
        );

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("Failed to set tracing subscriber");
        }

        LogGuard::default()
    }

    #[inline(always)]
    pub const fn log_file_path() -> Option<&'static PathBuf> {
        None
    }
}

pub use inner::*;
