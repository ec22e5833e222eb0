//! Plugin configuration
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high -> low):
//! 1. CLI arguments
//! 2. Environment variables (SLURM_SUBMIT_POLICY_DIR)
//! 3. Config file (TOML)
//! 4. Default values
//! ```
//!
//! # Example
//!
//! ```toml
//! [policy]
//! script_dir = "/etc/slurm"
//!
//! [log]
//! level = "debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::util::logger::LogLevel;

/// Environment variable overriding the policy directory
pub const SCRIPT_DIR_ENV: &str = "SLURM_SUBMIT_POLICY_DIR";

/// Directory searched for the policy when nothing else is configured
pub const DEFAULT_SCRIPT_DIR: &str = "/etc/slurm";

/// Plugin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PluginConfig {
    /// Policy script settings
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Policy script configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Directory holding `job_submit.rhai` and anything it imports
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,
}

fn default_script_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SCRIPT_DIR)
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            script_dir: default_script_dir(),
        }
    }
}

/// Log configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
}

impl PluginConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::ParseError)
    }

    pub fn script_dir(&self) -> &Path {
        &self.policy.script_dir
    }

    /// Apply environment overrides, looking variables up through `lookup`
    pub fn apply_overrides<F>(
        &mut self,
        lookup: F,
    ) where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(SCRIPT_DIR_ENV).filter(|dir| !dir.is_empty()) {
            self.policy.script_dir = PathBuf::from(dir);
        }
    }
}

/// Load configuration from `path`, or defaults when no path is given,
/// then apply environment overrides
pub fn load(path: Option<&Path>) -> Result<PluginConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
            PluginConfig::from_toml(&content)?
        }
        None => PluginConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
