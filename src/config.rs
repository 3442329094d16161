//! Configuration types for tabstate

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::format::{DecodeLimits, DEFAULT_MAX_FIELD_BYTES};
use crate::{Result, TabStateError};

/// Location of the TabState directory below `%LOCALAPPDATA%`
pub const TABSTATE_SUBDIR: &str =
    r"Packages\Microsoft.WindowsNotepad_8wekyb3d8bbwe\LocalState\TabState";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding tab state files
    #[serde(default)]
    pub tabstate_dir: Option<PathBuf>,
    /// Extension of candidate files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// File name suffixes of records this decoder does not handle
    #[serde(default = "default_skip_suffixes")]
    pub skip_suffixes: Vec<String>,
    /// Resource limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_extension() -> String {
    "bin".to_string()
}

fn default_skip_suffixes() -> Vec<String> {
    vec![".0.bin".to_string(), ".1.bin".to_string()]
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum size of a single length-prefixed field in bytes
    #[serde(default = "default_max_field_bytes")]
    pub max_field_bytes: u64,
    /// Files larger than this are not read
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Maximum files decoded in parallel
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_field_bytes() -> u64 {
    DEFAULT_MAX_FIELD_BYTES
}

fn default_max_file_size() -> u64 {
    256 * 1024 * 1024 // 256 MB
}

fn default_max_concurrency() -> usize {
    8
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_field_bytes: default_max_field_bytes(),
            max_file_size: default_max_file_size(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl LimitsConfig {
    /// Limits handed to the record decoder
    #[must_use]
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_field_bytes: self.max_field_bytes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tabstate_dir: None,
            extension: default_extension(),
            skip_suffixes: default_skip_suffixes(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TabStateError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| TabStateError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(TabStateError::ConfigError(format!(
                "extension must be non-empty and given without a dot: {:?}",
                self.extension
            )));
        }

        if self.limits.max_field_bytes == 0 {
            return Err(TabStateError::ConfigError(
                "max_field_bytes must be > 0".to_string(),
            ));
        }

        if self.limits.max_file_size == 0 {
            return Err(TabStateError::ConfigError(
                "max_file_size must be > 0".to_string(),
            ));
        }

        if self.limits.max_concurrency == 0 {
            return Err(TabStateError::ConfigError(
                "max_concurrency must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// TabState directory: the configured one, else the per-user default
    ///
    /// # Errors
    ///
    /// Returns error if no directory is configured and `LOCALAPPDATA` is unset
    pub fn resolve_tabstate_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.tabstate_dir {
            return Ok(dir.clone());
        }

        default_tabstate_dir().ok_or_else(|| {
            TabStateError::ConfigError(
                "LOCALAPPDATA is not set; pass a TabState directory explicitly".to_string(),
            )
        })
    }
}

/// Per-user TabState directory derived from `LOCALAPPDATA`
#[must_use]
pub fn default_tabstate_dir() -> Option<PathBuf> {
    let local_app_data = std::env::var_os("LOCALAPPDATA")?;
    let mut dir = PathBuf::from(local_app_data);
    dir.extend(TABSTATE_SUBDIR.split('\\'));
    Some(dir)
}
