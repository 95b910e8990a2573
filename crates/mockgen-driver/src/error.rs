//! Error types for mockgen-driver.

use crate::override_parser::OverrideParseError;
use miette::Diagnostic;
use mockgen_core::MockGenError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mockgen-driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur while generating mocks for one header.
#[derive(Error, Diagnostic, Debug)]
pub enum DriverError {
    /// Failed to read configuration file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(mockgen::driver::read_config))]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    #[diagnostic(code(mockgen::driver::parse_toml))]
    ParseToml(#[from] toml::de::Error),

    /// Malformed override given on the command line or in the config file.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Override(#[from] OverrideParseError),

    /// Translation failed in a way that stops the unit.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Generation(#[from] MockGenError),

    /// Failed to write an output file.
    #[error("Failed to write {path}: {source}")]
    #[diagnostic(code(mockgen::driver::write_output))]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Inconsistent options.
    #[error("Invalid options: {0}")]
    #[diagnostic(code(mockgen::driver::options))]
    Options(String),
}
