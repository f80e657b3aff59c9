//! Integration tests for loading the CLI configuration from disk.

use std::path::PathBuf;

use credforge_cli::{load_config, StoreKind};
use credforge_core::{ContentType, StoreBackend};
use tempfile::TempDir;

#[test]
fn test_load_explicit_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        default_content_type = "yaml"

        [store]
        kind = "memory"
        "#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.config_path, path);
    assert_eq!(config.store, StoreBackend::Memory);
    assert_eq!(config.default_content_type, ContentType::Yaml);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_missing_explicit_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let err = load_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_malformed_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "default_content_type = \"xml\"").unwrap();

    let err = load_config(Some(&path)).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config"));
}

#[test]
fn test_data_dir_override_selects_file_backend() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[store]\nkind = \"memory\"\n").unwrap();

    let mut config = load_config(Some(&path)).unwrap();
    config.apply_overrides(Some(StoreKind::File), Some(PathBuf::from("/srv/creds")));

    assert_eq!(
        config.store,
        StoreBackend::File {
            path: Some(PathBuf::from("/srv/creds"))
        }
    );
}
