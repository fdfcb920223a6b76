//! Client configuration, persisted as TOML.
//!
//! Every field has a serde default, so a partial file (or no file at all)
//! yields a usable config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, FinderResult};
use crate::paths::FinderPaths;

/// A loaded config together with the file it came from (or would come from).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub path: PathBuf,
    pub config: FinderConfig,
}

/// Runtime configuration for the search client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Root URL of the Open Library compatible search service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Term searched when the query text is blank.
    #[serde(default = "default_query")]
    pub default_query: String,
    /// Records per results page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Maximum number of autocomplete suggestions.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: u32,
    /// Highest page number the pagination strip will offer.
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,
    /// Width of the page-number window between the pinned first and last pages.
    #[serde(default = "default_max_visible_pages")]
    pub max_visible_pages: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Quiet period before a suggestion fetch is sent. 0 sends on every keystroke.
    #[serde(default)]
    pub suggest_debounce_ms: u64,
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://openlibrary.org".into()
}
fn default_query() -> String {
    "book".into()
}
fn default_page_size() -> u32 {
    20
}
fn default_suggestion_limit() -> u32 {
    5
}
fn default_page_cap() -> u32 {
    100
}
fn default_max_visible_pages() -> u32 {
    5
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!("book-finder/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_query: default_query(),
            page_size: default_page_size(),
            suggestion_limit: default_suggestion_limit(),
            page_cap: default_page_cap(),
            max_visible_pages: default_max_visible_pages(),
            request_timeout_secs: default_request_timeout_secs(),
            suggest_debounce_ms: 0,
            user_agent: default_user_agent(),
        }
    }
}

impl FinderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `None` when suggestions are fetched on every keystroke.
    pub fn suggest_debounce(&self) -> Option<Duration> {
        (self.suggest_debounce_ms > 0).then(|| Duration::from_millis(self.suggest_debounce_ms))
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = [
            ("page_size", self.page_size),
            ("suggestion_limit", self.suggestion_limit),
            ("page_cap", self.page_cap),
            ("max_visible_pages", self.max_visible_pages),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    message: "must be at least 1".into(),
                });
            }
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "base_url".into(),
                message: format!("\"{}\" must start with http:// or https://", self.base_url),
            });
        }
        if self.default_query.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "default_query".into(),
                message: "must not be blank".into(),
            });
        }
        Ok(())
    }

    /// `explicit` when given, otherwise the XDG config file.
    pub fn config_path(explicit: Option<&Path>) -> FinderResult<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(FinderPaths::resolve()?.config_file()),
        }
    }

    /// Locate and load the config; a missing file yields defaults.
    pub fn resolve(explicit: Option<&Path>) -> FinderResult<ResolvedConfig> {
        let path = Self::config_path(explicit)?;
        let config = Self::load_or_default(&path)?;
        Ok(ResolvedConfig { path, config })
    }

    /// Write the default config to `path`. An existing file is kept unless `force`.
    pub fn write_defaults(path: &Path, force: bool) -> ConfigResult<()> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.display().to_string(),
            });
        }
        Self::default().save(path)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml(path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Render as pretty TOML; `origin` only labels the error.
    pub fn to_toml(&self, origin: &Path) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: origin.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_open_library_client() {
        let config = FinderConfig::default();
        assert_eq!(config.base_url, "https://openlibrary.org");
        assert_eq!(config.default_query, "book");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.suggestion_limit, 5);
        assert_eq!(config.page_cap, 100);
        assert_eq!(config.max_visible_pages, 5);
        assert!(config.suggest_debounce().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: FinderConfig =
            toml::from_str("page_size = 10\nsuggest_debounce_ms = 250\n").unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.suggest_debounce(), Some(Duration::from_millis(250)));
        assert_eq!(config.default_query, "book");
        assert_eq!(config.page_cap, 100);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let config = FinderConfig {
            base_url: "http://127.0.0.1:8080".into(),
            page_cap: 50,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(FinderConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = FinderConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, FinderConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = \"twenty\"").unwrap();
        assert!(matches!(
            FinderConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn resolve_uses_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "default_query = \"novel\"\n").unwrap();
        let resolved = FinderConfig::resolve(Some(&path)).unwrap();
        assert_eq!(resolved.path, path);
        assert_eq!(resolved.config.default_query, "novel");
    }

    #[test]
    fn resolve_surfaces_config_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_cap = 0\n").unwrap();
        assert!(matches!(
            FinderConfig::resolve(Some(&path)),
            Err(crate::error::FinderError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn write_defaults_needs_force_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        FinderConfig::write_defaults(&path, false).unwrap();
        assert!(matches!(
            FinderConfig::write_defaults(&path, false),
            Err(ConfigError::AlreadyExists { .. })
        ));

        std::fs::write(&path, "page_size = 7\n").unwrap();
        FinderConfig::write_defaults(&path, true).unwrap();
        assert_eq!(FinderConfig::load(&path).unwrap(), FinderConfig::default());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = FinderConfig {
            page_size: 0,
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "page_size"),
            other => panic!("expected invalid page_size, got {other:?}"),
        }
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let config = FinderConfig {
            base_url: "openlibrary.org".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
