//! Tracing subscriber setup.
//!
//! One-shot commands log to stderr. The TUI owns the terminal, so it logs to
//! a plain-text file under the state directory instead.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use miette::Diagnostic;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors from installing the log subscriber.
#[derive(Debug, Error, Diagnostic)]
pub enum LogError {
    #[error("failed to open log file: {path}")]
    #[diagnostic(
        code(finder::log::open),
        help("Check that the state directory is writable, or set XDG_STATE_HOME.")
    )]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install log subscriber: {message}")]
    #[diagnostic(code(finder::log::install))]
    Install { message: String },
}

pub type LogResult<T> = std::result::Result<T, LogError>;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Appended to; ANSI colors are disabled.
    File(PathBuf),
}

/// `RUST_LOG` when set, otherwise `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber for `target`.
pub fn init(target: &LogTarget) -> LogResult<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    installed.map_err(|e| LogError::Install {
        message: e.to_string(),
    })
}

fn open_log_file(path: &Path) -> LogResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogError::Open {
            path: path.display().to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created_and_appended() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("book-finder.log");
        std::fs::write(&path, "earlier\n").unwrap();
        drop(open_log_file(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\n");
    }

    #[test]
    fn missing_directory_is_an_open_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent").join("book-finder.log");
        assert!(matches!(open_log_file(&path), Err(LogError::Open { .. })));
    }
}
