//! Generator configuration (mockgen.toml format) and merged options.

use crate::error::{DriverError, Result};
use crate::override_parser::{parse_override, OverrideScope};
use mockgen_clang::{Language, ParseOptions};
use mockgen_core::Config;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Root of a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Register typedef'd records under their underlying name.
    #[serde(default)]
    pub use_underlying_typedef: bool,

    /// Include directories.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Preprocessor definitions.
    #[serde(default)]
    pub defines: Vec<String>,

    /// Language standard (e.g., "c++14", "c11").
    #[serde(default)]
    pub std: Option<String>,

    /// Parameter overrides, `"func#arg" = "<spec>"` or `"func@" = "<spec>"`.
    #[serde(default)]
    pub param_overrides: BTreeMap<String, String>,

    /// Type overrides, `"#Type" = "<spec>"` or `"@Type" = "<spec>"`.
    #[serde(default)]
    pub type_overrides: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DriverError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Everything needed to process one header.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub parse: ParseOptions,
    pub config: Config,
    /// Parse as C++ regardless of the file extension
    pub force_cpp: bool,
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from a configuration file; later command-line values extend them.
    pub fn from_config_file(file: &ConfigFile) -> Result<Self> {
        let mut options = Self::new();
        options.config.set_use_underlying_typedef(file.use_underlying_typedef);
        options.parse.std = file.std.clone();
        options.parse.include_paths = file.includes.iter().map(PathBuf::from).collect();
        options.parse.defines = file.defines.clone();

        for (key, spec) in &file.param_overrides {
            options.add_param_override(&format!("{}={}", key, spec))?;
        }
        for (key, spec) in &file.type_overrides {
            options.add_type_override(&format!("{}={}", key, spec))?;
        }
        Ok(options)
    }

    /// Add a `func@=<spec>` or `func#arg=<spec>` override.
    pub fn add_param_override(&mut self, text: &str) -> Result<()> {
        let (key, spec) = parse_override(text, OverrideScope::Parameter)?;
        self.config.add_override(key, spec);
        Ok(())
    }

    /// Add a `@Type=<spec>` or `#Type=<spec>` override.
    pub fn add_type_override(&mut self, text: &str) -> Result<()> {
        let (key, spec) = parse_override(text, OverrideScope::Type)?;
        self.config.add_override(key, spec);
        Ok(())
    }

    /// Language to parse `input` as.
    ///
    /// C++ when forced, when the standard is a C++ one, or when the extension
    /// is a C++ header extension; C otherwise.
    pub fn language_for(&self, input: &Path) -> Language {
        let cpp_std = self
            .parse
            .std
            .as_deref()
            .is_some_and(|std| std.starts_with("c++") || std.starts_with("gnu++"));
        let cpp_extension = input
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "hpp" | "hxx" | "hh" | "h++" | "H"));

        if self.force_cpp || cpp_std || cpp_extension {
            Language::Cpp
        } else {
            Language::C
        }
    }

    /// Parse options for `input`, with the language resolved.
    pub fn parse_options_for(&self, input: &Path) -> ParseOptions {
        let mut parse = self.parse.clone();
        parse.language = self.language_for(input);
        parse
    }
}
