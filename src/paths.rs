//! XDG-compliant path resolution for book-finder.
//!
//! `FinderPaths` holds the config and state directories; the config file and
//! the TUI log file are derived from them.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(finder::paths::no_home),
        help("Set the HOME environment variable or pass --config explicitly.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(finder::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

const APP_DIR: &str = "book-finder";

/// Global XDG-compliant directories for book-finder.
#[derive(Debug, Clone)]
pub struct FinderPaths {
    /// `$XDG_CONFIG_HOME/book-finder/`
    pub config_dir: PathBuf,
    /// `$XDG_STATE_HOME/book-finder/`
    pub state_dir: PathBuf,
}

impl FinderPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join(APP_DIR);

        let state_dir = std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/state"))
            .join(APP_DIR);

        Ok(Self {
            config_dir,
            state_dir,
        })
    }

    /// Build paths rooted at explicit directories.
    pub fn with_dirs(config_dir: impl Into<PathBuf>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            state_dir: state_dir.into(),
        }
    }

    /// `config.toml` inside the config directory.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Log file written by the TUI.
    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join("book-finder.log")
    }

    /// Create the state directory if it does not exist yet.
    pub fn ensure_state_dir(&self) -> PathResult<&Path> {
        std::fs::create_dir_all(&self.state_dir).map_err(|e| PathError::CreateDir {
            path: self.state_dir.display().to_string(),
            source: e,
        })?;
        Ok(&self.state_dir)
    }
}
