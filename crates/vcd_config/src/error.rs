//! Errors raised while reading `vcd.toml`.

use std::io;
use std::path::PathBuf;

/// Why a loader configuration could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    IoError {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or does not match the expected schema.
    #[error("malformed loader configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A field parsed but holds a value the loader cannot use.
    #[error("{field}: {reason}")]
    ValidationError {
        /// Dotted key of the offending field, e.g. `loader.buffer_size`.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Returns the dotted key of the rejected field for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(*field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_the_field() {
        let err = ConfigError::ValidationError {
            field: "loader.buffer_size",
            reason: "must be greater than zero",
        };
        assert_eq!(err.to_string(), "loader.buffer_size: must be greater than zero");
        assert_eq!(err.field(), Some("loader.buffer_size"));
    }

    #[test]
    fn io_message_names_the_file() {
        let err = ConfigError::IoError {
            path: PathBuf::from("/tmp/cfg/vcd.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "cannot read /tmp/cfg/vcd.toml: denied");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn parse_errors_convert_from_toml() {
        let toml_err = toml::from_str::<toml::Table>("key = ").unwrap_err();
        let err = ConfigError::from(toml_err);
        assert!(err.to_string().starts_with("malformed loader configuration:"));
    }
}
