//! Configuration file resolution and loading
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/mixtape/config.toml`), if the file exists
//! 4. None: callers fall back to built-in defaults
//!
//! A missing config file is never fatal. An explicitly named file that cannot be read or
//! parsed is an error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "MIXTAPE_CONFIG";

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    PlatformDefault(PathBuf),
    BuiltIn,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p)
            | ConfigSource::Environment(p)
            | ConfigSource::PlatformDefault(p) => Some(p),
            ConfigSource::BuiltIn => None,
        }
    }
}

/// Resolve which config file (if any) should be loaded
pub fn resolve_config_source(cli_arg: Option<&Path>, env_var_name: &str) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    if let Some(path) = default_config_path() {
        if path.exists() {
            return ConfigSource::PlatformDefault(path);
        }
    }

    ConfigSource::BuiltIn
}

/// Platform config file location (`~/.config/mixtape/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mixtape").join("config.toml"))
}

/// Parse a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    let value = toml::from_str::<T>(&content)?;
    debug!(path = %path.display(), "Loaded config file");
    Ok(value)
}

/// Resolve and load a config, falling back to `T::default()` when no file is available
///
/// An explicitly requested file (CLI or environment) must load successfully. A file found
/// only through the platform default location degrades to defaults with a warning.
pub fn load_config<T>(cli_arg: Option<&Path>, env_var_name: &str) -> Result<(T, ConfigSource)>
where
    T: DeserializeOwned + Default,
{
    let source = resolve_config_source(cli_arg, env_var_name);
    let config = match &source {
        ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => load_toml(path)?,
        ConfigSource::PlatformDefault(path) => match load_toml(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config, using defaults");
                T::default()
            }
        },
        ConfigSource::BuiltIn => T::default(),
    };
    Ok((config, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        name: String,
        #[serde(default)]
        logging: LoggingConfig,
    }

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "info");
        assert!(logging.file.is_none());
    }

    #[test]
    fn test_cli_argument_wins() {
        let source = resolve_config_source(Some(Path::new("/tmp/cli.toml")), "MIXTAPE_TEST_UNSET_VAR");
        assert_eq!(source, ConfigSource::CommandLine(PathBuf::from("/tmp/cli.toml")));
        assert_eq!(source.path(), Some(Path::new("/tmp/cli.toml")));
    }

    #[test]
    fn test_load_toml_parses_nested_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"demo\"\n[logging]\nlevel = \"debug\"").unwrap();

        let sample: Sample = load_toml(file.path()).unwrap();
        assert_eq!(sample.name, "demo");
        assert_eq!(sample.logging.level, "debug");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = load_config::<Sample>(
            Some(Path::new("/definitely/not/here/config.toml")),
            "MIXTAPE_TEST_UNSET_VAR",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = [unterminated").unwrap();

        let result = load_toml::<Sample>(file.path());
        assert!(matches!(result, Err(Error::TomlParse(_))));
    }
}
