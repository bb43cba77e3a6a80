//! Error types for schema loading

use std::path::PathBuf;

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema loading errors
///
/// Every variant aborts the load that raised it; there is no partial schema.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unknown type {0}")]
    UnknownType(String),

    #[error("Illegal property specifier {0}")]
    IllegalSpecifier(String),

    #[error("Cannot apply {modifier} to {detail}")]
    IllegalModifier { modifier: &'static str, detail: String },

    #[error("Only class definitions allowed in schema, found {0}")]
    NotAClass(String),

    #[error("Class name must be capitalized, found {0}")]
    UncapitalizedName(String),

    #[error("Bases with mixed groups for {0}")]
    MixedGroupBases(String),

    #[error("Bases with mixed groups for {class}: base {base} is in group '{base_group}', class is in group '{group}'")]
    CrossGroupBase {
        class: String,
        base: String,
        group: String,
        base_group: String,
    },

    #[error("Duplicate class {0}")]
    DuplicateClass(String),

    #[error("Duplicate property {property} in class {class}")]
    DuplicateProperty { class: String, property: String },

    #[error("Only one root class allowed, found second root {0}")]
    SecondRoot(String),

    #[error("Inheritance cycle in group '{group}': {}", members.join(", "))]
    InheritanceCycle { group: String, members: Vec<String> },

    #[error("Unsupported schema document format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
