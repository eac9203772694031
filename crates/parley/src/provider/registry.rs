//! Provider registry loaded from a directory of JSON files.
//!
//! Each file whose name ends in `.json` (a bare `.json` included) holds one
//! [`ProviderRecord`].
//! Files are read in file-name order so lookups by name are stable: when two
//! files declare the same `name`, the lexically first file wins and the
//! duplicate is reported at load time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::record::ProviderRecord;

/// File name skipped during the scan; it holds other configuration.
pub const DEFAULT_RESERVED_FILE: &str = "api_providers.json";

/// Errors that prevent a scan from running at all.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read providers directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single provider file was skipped.
#[derive(Debug, Error)]
enum SkipReason {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered list of loaded providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<ProviderRecord>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderRecord>) -> Self {
        Self { providers }
    }

    /// Scan `dir`, skipping `reserved_file` and any file that fails to parse.
    pub fn load(dir: &Path, reserved_file: &str) -> Result<Self, RegistryError> {
        let providers = load_providers_excluding(dir, reserved_file)?;
        Ok(Self::new(providers))
    }

    /// First provider named `name`.
    pub fn get(&self, name: &str) -> Option<&ProviderRecord> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Provider names in registry order, duplicates included.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name.as_str()).collect()
    }

    /// Models offered by the provider named `name`.
    pub fn models(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|p| p.models.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderRecord> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Load every provider file in `dir` except [`DEFAULT_RESERVED_FILE`].
pub fn load_providers(dir: &Path) -> Result<Vec<ProviderRecord>, RegistryError> {
    load_providers_excluding(dir, DEFAULT_RESERVED_FILE)
}

/// Load every provider file in `dir` except `reserved_file`.
///
/// Malformed or unreadable files are logged and skipped. Only an unreadable
/// directory is an error.
pub fn load_providers_excluding(
    dir: &Path,
    reserved_file: &str,
) -> Result<Vec<ProviderRecord>, RegistryError> {
    let read_dir = std::fs::read_dir(dir).map_err(|source| RegistryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(".json") && n != reserved_file)
                .unwrap_or(false)
        })
        .collect();

    paths.sort();

    let mut providers = Vec::with_capacity(paths.len());
    let mut seen = HashSet::new();
    for path in paths {
        match read_provider(&path) {
            Ok(provider) => {
                if !seen.insert(provider.name.clone()) {
                    warn!(
                        path = %path.display(),
                        name = %provider.name,
                        "Duplicate provider name, earlier file takes precedence"
                    );
                }
                debug!(path = %path.display(), name = %provider.name, "Loaded provider");
                providers.push(provider);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping provider file");
            }
        }
    }

    info!(dir = %dir.display(), count = providers.len(), "Loaded providers");
    Ok(providers)
}

fn read_provider(path: &Path) -> Result<ProviderRecord, SkipReason> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
