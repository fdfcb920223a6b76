//! Rich diagnostic error types for book-finder.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! so a failed request or a broken config file tells the user what went wrong
//! and where to look.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for book-finder.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum FinderError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] crate::paths::PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Log(#[from] crate::logging::LogError),
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Failures talking to the book search provider.
///
/// The controller treats every variant the same way ("fetch failed"); the
/// split only matters for the diagnostics shown by one-shot commands.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ProviderError {
    #[error("request to {url} failed: {message}")]
    #[diagnostic(
        code(finder::provider::request),
        help(
            "The search provider could not be reached. Check the network connection \
             and the `base_url` setting in your config file."
        )
    )]
    Request { url: String, message: String },

    #[error("search provider answered HTTP {status}")]
    #[diagnostic(
        code(finder::provider::status),
        help("The provider rejected the request or is having trouble. Try again later.")
    )]
    Status { status: u16 },

    #[error("could not decode provider response: {message}")]
    #[diagnostic(
        code(finder::provider::decode),
        help(
            "The response was not the expected search JSON. \
             Is `base_url` pointing at an Open Library compatible endpoint?"
        )
    )]
    Decode { message: String },
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(finder::config::read),
        help("Ensure the config file is readable, or remove it to fall back to defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(finder::config::parse),
        help("Check the TOML syntax. `book-finder config init --force` rewrites the defaults.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(finder::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config already exists: {path}")]
    #[diagnostic(
        code(finder::config::exists),
        help("Pass --force to overwrite it with the defaults.")
    )]
    AlreadyExists { path: String },

    #[error("invalid config value for `{field}`: {message}")]
    #[diagnostic(code(finder::config::invalid))]
    Invalid { field: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for crate-level results.
pub type FinderResult<T> = std::result::Result<T, FinderError>;
