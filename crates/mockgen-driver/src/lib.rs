//! Orchestration of the CppUTest mock generator.
//!
//! This crate provides:
//! - The override option mini-language (`-p` / `-t`)
//! - The TOML configuration file and merged generator options
//! - The per-header pipeline producing the mock file, the expectation
//!   header and the expectation implementation
//! - Output destinations (files, directories, stdout)

mod config;
mod driver;
mod error;
mod output;
mod override_parser;

pub use config::{ConfigFile, GeneratorOptions};
pub use driver::{Driver, UnitOutput};
pub use error::{DriverError, Result};
pub use output::{banner, stem, OutputTarget};
pub use override_parser::{parse_override, OverrideParseError, OverrideScope};
