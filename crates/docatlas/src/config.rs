//! Configuration management for docatlas.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "docatlas";

/// Prefix of environment variables read by [`Config::load_from`].
const ENV_PREFIX: &str = "DOCATLAS_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `DOCATLAS_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/docatlas/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content tree configuration.
    pub content: ContentConfig,
}

/// Where the content lives and how it is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Content root directory.
    /// Defaults to the current directory.
    pub root: Option<PathBuf>,
    /// Directory of speech documents, relative to the root.
    pub speeches_dir: String,
    /// Directory of per-project documentation sets, relative to the root.
    pub projects_dir: String,
    /// Overview file holding the comparison table, relative to the
    /// projects directory.
    pub overview_file: String,
    /// Project name given to the speech documents.
    pub speeches_project: String,
    /// File extensions considered documents, without the dot.
    pub extensions: Vec<String>,
    /// Regex matching the ordinal prefix of a file stem. The first capture
    /// group must hold the number.
    pub ordinal_pattern: String,
    /// Table cell texts that mark a value as absent.
    pub absent_markers: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: None,
            speeches_dir: "speeches".to_string(),
            projects_dir: "projects".to_string(),
            overview_file: "README.md".to_string(),
            speeches_project: "speeches".to_string(),
            extensions: vec!["md".to_string()],
            ordinal_pattern: r"^(\d+)[-_. ]".to_string(),
            absent_markers: default_absent_markers(),
        }
    }
}

/// Default absent markers for comparison table cells.
fn default_absent_markers() -> Vec<String> {
    vec![
        String::new(),
        "-".to_string(),
        "—".to_string(),
        "n/a".to_string(),
    ]
}

impl ContentConfig {
    /// Check whether a path has one of the configured document extensions.
    #[must_use]
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Check whether a trimmed cell text is an absent marker
    /// (case-insensitive).
    #[must_use]
    pub fn is_absent_marker(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.absent_markers
            .iter()
            .any(|m| m.trim().eq_ignore_ascii_case(cell))
    }

    /// Compile the ordinal pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the pattern is not a valid regex
    /// or has no capture group.
    pub fn ordinal_regex(&self) -> Result<Regex> {
        let regex = Regex::new(&self.ordinal_pattern).map_err(|e| Error::ConfigValidation {
            message: format!("invalid ordinal_pattern {}: {e}", self.ordinal_pattern),
        })?;
        if regex.captures_len() < 2 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "ordinal_pattern {} must contain a capture group",
                    self.ordinal_pattern
                ),
            });
        }
        Ok(regex)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let content = &self.content;

        for (key, value) in [
            ("speeches_dir", &content.speeches_dir),
            ("projects_dir", &content.projects_dir),
            ("overview_file", &content.overview_file),
            ("speeches_project", &content.speeches_project),
        ] {
            if value.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("{key} must not be empty"),
                });
            }
        }

        if content.speeches_project.contains(crate::document::ID_SEPARATOR) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "speeches_project must not contain '{}'",
                    crate::document::ID_SEPARATOR
                ),
            });
        }

        if content.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: "extensions must list at least one extension".to_string(),
            });
        }

        content.ordinal_regex()?;
        Ok(())
    }

    /// Get the content root, resolving the default if not set.
    #[must_use]
    pub fn content_root(&self) -> PathBuf {
        self.content
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
