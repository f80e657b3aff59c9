//! CLI configuration handling.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use credforge_core::{ContentType, StoreBackend};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Path to the configuration file that was loaded.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Where credentials are stored.
    #[serde(default)]
    pub store: StoreBackend,

    /// Content type used when a command doesn't pass `--content-type`.
    #[serde(default)]
    pub default_content_type: ContentType,

    /// Logging level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            store: StoreBackend::default(),
            default_content_type: ContentType::default(),
            log_level: default_log_level(),
        }
    }
}

/// Storage backend selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Memory,
    File,
}

impl CliConfig {
    /// Apply command-line overrides on top of the loaded file.
    ///
    /// `--data-dir` implies the file backend unless `--store memory` is given.
    pub fn apply_overrides(&mut self, store: Option<StoreKind>, data_dir: Option<PathBuf>) {
        let current_path = match &self.store {
            StoreBackend::File { path } => path.clone(),
            StoreBackend::Memory => None,
        };

        self.store = match (store, data_dir) {
            (Some(StoreKind::Memory), _) => StoreBackend::Memory,
            (Some(StoreKind::File), dir) => StoreBackend::File {
                path: dir.or(current_path),
            },
            (None, Some(dir)) => StoreBackend::File { path: Some(dir) },
            (None, None) => return,
        };
    }
}

/// Load configuration from `path`, or from the default location.
///
/// An explicit path must exist. A missing file at the default location
/// yields the default configuration.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let (config_path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (default_config_path(), false),
    };

    let mut config = if config_path.exists() {
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?
    } else if required {
        bail!("Config file {:?} does not exist", config_path);
    } else {
        CliConfig::default()
    };

    config.config_path = config_path;
    Ok(config)
}

fn default_config_path() -> PathBuf {
    ProjectDirs::from("com", "raibid-labs", "credforge")
        .map(|d| d.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("credforge.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: CliConfig = toml::from_str(
            r#"
            default_content_type = "yaml"
            log_level = "debug"

            [store]
            kind = "file"
            path = "/var/lib/credforge"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_content_type, ContentType::Yaml);
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.store,
            StoreBackend::File {
                path: Some(PathBuf::from("/var/lib/credforge"))
            }
        );
    }

    #[test]
    fn test_default_content_type_accepts_mime() {
        let config: CliConfig =
            toml::from_str("default_content_type = \"application/x-yaml\"").unwrap();
        assert_eq!(config.default_content_type, ContentType::Yaml);

        assert!(toml::from_str::<CliConfig>("default_content_type = \"text/xml\"").is_err());
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_content_type, ContentType::Json);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.store, StoreBackend::File { path: None });
    }

    #[test]
    fn test_overrides() {
        let mut config = CliConfig::default();
        config.apply_overrides(None, None);
        assert_eq!(config.store, StoreBackend::File { path: None });

        config.apply_overrides(None, Some(PathBuf::from("/tmp/a")));
        assert_eq!(
            config.store,
            StoreBackend::File {
                path: Some(PathBuf::from("/tmp/a"))
            }
        );

        config.apply_overrides(Some(StoreKind::File), None);
        assert_eq!(
            config.store,
            StoreBackend::File {
                path: Some(PathBuf::from("/tmp/a"))
            }
        );

        config.apply_overrides(Some(StoreKind::Memory), Some(PathBuf::from("/tmp/b")));
        assert_eq!(config.store, StoreBackend::Memory);
    }
}
