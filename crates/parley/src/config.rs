use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::provider::DEFAULT_RESERVED_FILE;

/// Default location of the YAML config file.
pub const DEFAULT_CONFIG_FILE: &str = "parley.yaml";

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Directory scanned for provider JSON files.
    #[serde(default = "default_providers_dir")]
    pub providers_dir: PathBuf,
    /// File name in `providers_dir` that is not a provider.
    #[serde(default = "default_reserved_file")]
    pub reserved_file: String,
    /// System prompt used when none is given on the command line.
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers_dir: default_providers_dir(),
            reserved_file: default_reserved_file(),
            default_prompt: default_prompt(),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

fn default_providers_dir() -> PathBuf {
    PathBuf::from("api-providers")
}

fn default_reserved_file() -> String {
    DEFAULT_RESERVED_FILE.to_string()
}

fn default_prompt() -> String {
    "You are an AI personal assistant.".to_string()
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
