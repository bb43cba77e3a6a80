//! Configuration for schema loading
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (class-schema.toml)
//! - Environment variables (CLASS_SCHEMA__*)
//!
//! ## Example config file (class-schema.toml):
//! ```toml
//! [loader]
//! primitives = ["int", "string", "boolean"]
//! reserved = ["defs"]
//! includes_name = "__includes"
//! cross_group_bases = "deny"
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::builder::CrossGroupPolicy;
use crate::declaration::INCLUDES_NAME;
use crate::error::Result;
use crate::loader::{LoadOptions, PRIMITIVES};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Loader settings
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Output settings for the CLI
    #[serde(default)]
    pub output: OutputConfig,
}

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Type names accepted without a declaration
    #[serde(default = "default_primitives")]
    pub primitives: Vec<String>,

    /// Top-level names skipped besides `__`-prefixed ones
    #[serde(default)]
    pub reserved: Vec<String>,

    /// Binding that carries the include list
    #[serde(default = "default_includes_name")]
    pub includes_name: String,

    /// Whether a base may live in another group than its derived class
    #[serde(default)]
    pub cross_group_bases: CrossGroupPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_primitives() -> Vec<String> {
    PRIMITIVES.iter().map(|p| p.to_string()).collect()
}

fn default_includes_name() -> String {
    INCLUDES_NAME.to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            primitives: default_primitives(),
            reserved: Vec::new(),
            includes_name: default_includes_name(),
            cross_group_bases: CrossGroupPolicy::Deny,
        }
    }
}

impl SchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, with `config_path` layered over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "class-schema.toml",
            ".class-schema.toml",
            "config/class-schema.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "class-schema", "class-schema") {
            let xdg_config = config_dir.config_dir().join("class-schema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CLASS_SCHEMA__LOADER__CROSS_GROUP_BASES=allow
        builder = builder.add_source(
            Environment::with_prefix("CLASS_SCHEMA")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("loader.primitives")
                .with_list_parse_key("loader.reserved")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Loader options described by this configuration
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            primitives: self.loader.primitives.clone(),
            reserved: self.loader.reserved.clone(),
            includes_name: self.loader.includes_name.clone(),
            cross_group_bases: self.loader.cross_group_bases,
        }
    }
}
