//! Unit tests for configuration loading and graceful degradation
//!
//! Tests:
//! - Missing config files fall back to compiled defaults
//! - Priority order: CLI argument > AIRSYNC_CONFIG > platform default
//! - Malformed files are reported, not ignored
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate AIRSYNC_CONFIG are marked with #[serial].

use airsync_common::config::{default_config_path, resolve_config_path, SyncConfig, CONFIG_ENV_VAR};
use airsync_common::{CivilTime, Error};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_from_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let config = SyncConfig::load_from(&missing).unwrap();
    assert_eq!(config, SyncConfig::default());
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
timezone = "America/New_York"
snapshot_ttl_secs = 3600
log_level = "debug"
"#,
    );

    let config = SyncConfig::load_from(file.path()).unwrap();
    assert_eq!(config.timezone, "America/New_York");
    assert_eq!(config.snapshot_ttl_secs, 3600);
    assert_eq!(config.snapshot_ttl(), chrono::Duration::hours(1));
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.civil_time().unwrap().name(), "America/New_York");
}

#[test]
fn test_malformed_file_is_error() {
    let file = write_config("timezone = [not toml");

    let err = SyncConfig::load_from(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_wrong_type_is_error() {
    let file = write_config("snapshot_ttl_secs = \"a day\"\n");
    assert!(SyncConfig::load_from(file.path()).is_err());
}

#[test]
#[serial]
fn test_cli_argument_beats_env_var() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/airsync-env-config.toml");

    let cli = PathBuf::from("/tmp/airsync-cli-config.toml");
    let resolved = resolve_config_path(Some(&cli));
    assert_eq!(resolved, Some(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_beats_platform_default() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/airsync-env-config.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/airsync-env-config.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    assert_eq!(resolve_config_path(None), default_config_path());

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_via_env_var() {
    let file = write_config("snapshot_ttl_secs = 60\n");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let config = SyncConfig::load(None).unwrap();
    assert_eq!(config.snapshot_ttl_secs, 60);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_with_missing_cli_path_does_not_error() {
    env::remove_var(CONFIG_ENV_VAR);

    let config = SyncConfig::load(Some(Path::new("/nonexistent/airsync/config.toml"))).unwrap();
    assert_eq!(config, SyncConfig::default());
}

#[test]
fn test_default_config_path_under_airsync_dir() {
    if let Some(path) = default_config_path() {
        assert!(path.ends_with("airsync/config.toml"));
    }
}
