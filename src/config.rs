//! Optional `.tfclean.yaml` configuration
//!
//! Only the pipeline's surroundings are configurable (block closing mode,
//! formatter, log level). The removal rules are compiled in.

use crate::cleanup::BlockClosing;
use crate::traits::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = ".tfclean.yaml";

const DEFAULT_FORMAT_COMMAND: &str = "terraform fmt";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanupConfig {
    pub block_closing: BlockClosing,
    pub format: FormatConfig,
    pub log_level: Option<String>,
}

/// Formatter run after cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    pub enabled: bool,
    /// Command line split on whitespace; the cleaned file path is appended
    pub command: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: DEFAULT_FORMAT_COMMAND.to_string(),
        }
    }
}

impl FormatConfig {
    /// Program and leading arguments of the formatter command
    pub fn argv(&self) -> Result<(String, Vec<String>)> {
        let mut parts = self.command.split_whitespace().map(str::to_string);

        let Some(program) = parts.next() else {
            anyhow::bail!("Empty format command in configuration");
        };

        Ok((program, parts.collect()))
    }
}

impl CleanupConfig {
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;
        let config: CleanupConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;

        config.format.argv()?;

        Ok(config)
    }

    /// Load `explicit` if given (it must exist), else the default file in the
    /// current directory if present, else defaults
    pub fn load(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !fs.is_file(path) {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            return Self::from_file(fs, path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if fs.is_file(default_path) {
            return Self::from_file(fs, default_path);
        }

        Ok(Self::default())
    }
}
