use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use grava_util::errors::GravaError;

/// Global configuration loaded from `~/.config/grava/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Sync database settings from `[database]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/var/lib/grava/sync.json")
}

/// Source-metadata cache settings from `[metadata]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_cache_path", rename = "cache-path")]
    pub cache_path: PathBuf,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("~/.cache/grava/metadata.json")
}

/// Resolution policy defaults from `[resolver]`; CLI flags override
/// these per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_max_lookups", rename = "max-concurrent-lookups")]
    pub max_concurrent_lookups: usize,

    #[serde(default, rename = "fail-fast")]
    pub fail_fast: bool,

    #[serde(default = "default_true", rename = "include-optional")]
    pub include_optional: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: default_max_lookups(),
            fail_fast: false,
            include_optional: true,
        }
    }
}

fn default_max_lookups() -> usize {
    8
}

fn default_true() -> bool {
    true
}

impl GlobalConfig {
    pub fn from_path(path: &Path) -> Result<Self, GravaError> {
        let content = std::fs::read_to_string(path).map_err(|e| GravaError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| GravaError::Config {
            message: format!("Failed to parse {}: {e}", path.display()),
        })
    }

    /// Default config location under the user's home directory.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/grava/config.toml"))
    }

    /// Load from an explicit path, the default location, or fall back
    /// to built-in defaults. Load failures never abort the caller.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let Some(candidate) = path.map(PathBuf::from).or_else(Self::default_path) else {
            return Self::default();
        };
        if !candidate.is_file() {
            if explicit {
                tracing::warn!(
                    "config file {} not found, using defaults",
                    candidate.display()
                );
            }
            return Self::default();
        }
        Self::from_path(&candidate).unwrap_or_else(|e| {
            tracing::warn!("failed to load config, using defaults: {e}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/grava/sync.json"));
        assert_eq!(config.resolver.max_concurrent_lookups, 8);
        assert!(config.resolver.include_optional);
        assert!(!config.resolver.fail_fast);
    }

    #[test]
    fn parse_partial_config() {
        let config: GlobalConfig = toml::from_str(
            r#"
            [database]
            path = "/tmp/sync.json"

            [resolver]
            fail-fast = true
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/sync.json"));
        assert!(config.resolver.fail_fast);
        // Untouched tables keep their defaults.
        assert_eq!(config.resolver.max_concurrent_lookups, 8);
        assert_eq!(
            config.metadata.cache_path,
            PathBuf::from("~/.cache/grava/metadata.json")
        );
    }

    #[test]
    fn parse_metadata_table() {
        let config: GlobalConfig = toml::from_str(
            r#"
            [metadata]
            cache-path = "/tmp/metadata.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.metadata.cache_path, PathBuf::from("/tmp/metadata.json"));
    }
}
