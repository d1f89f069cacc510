//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::LoaderConfig;
use std::path::Path;

/// Name of the configuration file looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "vcd.toml";

/// Loads and validates a `vcd.toml` configuration from a directory.
///
/// Reads `<dir>/vcd.toml`, parses it, and validates its values.
pub fn load_config(dir: &Path) -> Result<LoaderConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::IoError { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a `vcd.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LoaderConfig, ConfigError> {
    let config: LoaderConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable by the loader.
fn validate_config(config: &LoaderConfig) -> Result<(), ConfigError> {
    if config.loader.buffer_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "loader.buffer_size",
            reason: "must be greater than zero",
        });
    }
    if config.hierarchy.separator.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "hierarchy.separator",
            reason: "must not be empty",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LoadMode, DEFAULT_BUFFER_SIZE};

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert_eq!(config.loader.mode, LoadMode::Bulk);
        assert_eq!(config.loader.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.hierarchy.separator, ".");
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[loader]
mode = "streaming"
buffer_size = "8KiB"

[hierarchy]
separator = "/"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.loader.mode, LoadMode::Streaming);
        assert_eq!(config.loader.buffer_size, 8 * 1024);
        assert_eq!(config.hierarchy.separator, "/");
    }

    #[test]
    fn zero_buffer_size_errors() {
        let err = load_config_from_str("[loader]\nbuffer_size = 0\n").unwrap_err();
        assert_eq!(err.field(), Some("loader.buffer_size"));
    }

    #[test]
    fn empty_separator_errors() {
        let err = load_config_from_str("[hierarchy]\nseparator = \"\"\n").unwrap_err();
        assert_eq!(err.field(), Some("hierarchy.separator"));
    }

    #[test]
    fn unknown_mode_errors() {
        let err = load_config_from_str("[loader]\nmode = \"turbo\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[loader]\nmode = \"streaming\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.loader.mode, LoadMode::Streaming);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        match err {
            ConfigError::IoError { path, .. } => assert!(path.ends_with(CONFIG_FILE_NAME)),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
