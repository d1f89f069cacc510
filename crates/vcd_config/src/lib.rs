//! Parsing and validation of `vcd.toml` loader configuration files.
//!
//! This crate reads the loader configuration file and produces a strongly-typed
//! [`LoaderConfig`] selecting the load strategy, the streaming read window and
//! the separator used to build full hierarchical signal paths.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
