//! Config resolution tests
//!
//! Tests that set or clear MIXTAPE_CONFIG are marked #[serial] so they never race on
//! the process environment.

use std::env;
use std::io::Write;
use std::path::Path;

use mixtape_common::config::{
    default_config_path, load_config, resolve_config_source, ConfigSource, LoggingConfig,
    CONFIG_ENV_VAR,
};
use serde::Deserialize;
use serial_test::serial;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct AppConfig {
    #[serde(default)]
    user_id: i64,
    #[serde(default)]
    logging: LoggingConfig,
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    file
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    let file = write_config("user_id = 12\n[logging]\nlevel = \"warn\"\n");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let (config, source) = load_config::<AppConfig>(None, CONFIG_ENV_VAR).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(source, ConfigSource::Environment(file.path().to_path_buf()));
    assert_eq!(config.user_id, 12);
    assert_eq!(config.logging.level, "warn");
}

#[test]
#[serial]
fn test_cli_argument_beats_env_var() {
    let from_env = write_config("user_id = 1\n");
    let from_cli = write_config("user_id = 2\n");
    env::set_var(CONFIG_ENV_VAR, from_env.path());

    let (config, source) = load_config::<AppConfig>(Some(from_cli.path()), CONFIG_ENV_VAR).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(source, ConfigSource::CommandLine(from_cli.path().to_path_buf()));
    assert_eq!(config.user_id, 2);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");
    let source = resolve_config_source(None, CONFIG_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);

    assert!(!matches!(source, ConfigSource::Environment(_)));
}

#[test]
#[serial]
fn test_no_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    if default_config_path().is_some_and(|path| path.exists()) {
        // A real platform config is installed on this machine
        return;
    }

    let (config, source) = load_config::<AppConfig>(None, CONFIG_ENV_VAR).unwrap();
    assert_eq!(source, ConfigSource::BuiltIn);
    assert_eq!(source.path(), None);
    assert_eq!(config, AppConfig::default());
}

#[test]
#[serial]
fn test_env_var_pointing_at_missing_file_is_an_error() {
    env::set_var(CONFIG_ENV_VAR, "/definitely/not/here/mixtape.toml");
    let result = load_config::<AppConfig>(None, CONFIG_ENV_VAR);
    env::remove_var(CONFIG_ENV_VAR);

    assert!(result.is_err());
}

#[test]
fn test_default_path_is_under_mixtape_dir() {
    if let Some(path) = default_config_path() {
        assert!(path.ends_with(Path::new("mixtape").join("config.toml")));
    }
}
