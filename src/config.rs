//! # Generator Configuration
//!
//! [`GeneratorConfig`] collects everything that changes how a schema is
//! rendered and where it goes. It can be built in code, loaded from a YAML,
//! TOML or JSON file, and adjusted from the environment.
//!
//! ## File Format
//!
//! ```yaml
//! output_dir: proto
//! field_layout: type_first
//! well_known_types:
//!   Money:
//!     wire_type: google.type.Money
//!     import: google/type/money.proto
//! compiler:
//!   program: protoc
//!   args: ["--go_out=gen"]
//!   timeout_secs: 60
//! ```
//!
//! Every key is optional. `well_known_types` entries are added on top of the
//! built-in `Time` and `Duration` entries and may replace them.
//!
//! ## Environment Variables
//!
//! - `PROTOROOT_OUT_DIR` - overrides `output_dir`
//! - `PROTOROOT_PROTOC` - overrides `compiler.program`

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::{
    AssemblerOptions, CompilerConfig, FieldLayout, WellKnownType, WellKnownTypes,
};

pub const OUT_DIR_ENV: &str = "PROTOROOT_OUT_DIR";
pub const PROTOC_ENV: &str = "PROTOROOT_PROTOC";

/// Failure to load a [`GeneratorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported config format `{extension}` for {path} (expected yaml, yml, toml or json)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory the schema file is written to
    pub output_dir: PathBuf,
    pub field_layout: FieldLayout,
    /// Extra well-known types, merged over the built-in table
    pub well_known_types: BTreeMap<String, WellKnownType>,
    pub compiler: CompilerConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("proto"),
            field_layout: FieldLayout::default(),
            well_known_types: BTreeMap::new(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load a config file, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let config = match extension.as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
            }
            "toml" => toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
            "json" => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                })
            }
        };
        debug!(path = ?path, "Loaded generator config");
        Ok(config)
    }

    /// Apply `PROTOROOT_OUT_DIR` and `PROTOROOT_PROTOC` when set and non-empty.
    pub fn apply_env(&mut self) {
        if let Some(dir) = non_empty_var(OUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(program) = non_empty_var(PROTOC_ENV) {
            self.compiler.program = program;
        }
    }

    /// Built-in well-known types extended with the configured ones.
    pub fn well_known_types(&self) -> WellKnownTypes {
        let mut table = WellKnownTypes::default();
        table.extend(self.well_known_types.clone());
        table
    }

    pub fn assembler_options<'a>(&self, well_known: &'a WellKnownTypes) -> AssemblerOptions<'a> {
        AssemblerOptions::new(well_known).with_field_layout(self.field_layout)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
