//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing or malformed TOML file never aborts a run: a warning is logged
//! and the compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ASRKIT_CONFIG";

/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV_VAR: &str = "ASRKIT_LOG";

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AsrkitConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Corpus processing defaults (optional)
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Defaults for corpus preparation and splitting
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Output sample rate for prepared audio (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Minimum number of segments in each extracted split
    #[serde(default = "default_min_segments")]
    pub min_segments: usize,

    /// Size of the preparation worker pool
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Write prepared corpora with `sph/` and `stm/` subdirectories
    #[serde(default)]
    pub nested: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            min_segments: default_min_segments(),
            workers: default_workers(),
            nested: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_min_segments() -> usize {
    10
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl AsrkitConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration with graceful degradation
    ///
    /// Uses [`resolve_config_path`] to find a file. Any failure to read or
    /// parse it falls back to defaults with a warning.
    pub fn load(cli_arg: Option<&Path>) -> Self {
        let Some(path) = resolve_config_path(cli_arg) else {
            debug!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring config file, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve the effective log level
    ///
    /// **Priority:** CLI → `ASRKIT_LOG` → TOML → default
    pub fn resolve_log_level(&self, cli_arg: Option<&str>) -> String {
        if let Some(level) = cli_arg {
            return level.to_string();
        }
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV_VAR) {
            if !level.trim().is_empty() {
                return level;
            }
        }
        self.logging.level.clone()
    }
}

/// Find the config file to load
///
/// **Priority:** CLI → `ASRKIT_CONFIG` → `<config_dir>/asrkit/config.toml`
///
/// An explicit path (CLI or environment) is returned even if it does not
/// exist so the caller can report it; the platform default is only returned
/// when present.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Platform config location (`~/.config/asrkit/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("asrkit").join("config.toml"))
}
