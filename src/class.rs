//! Class model

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::property::Property;

/// Inter-procedural analysis binding attached to a class
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpaInfo {
    /// Class this one is synthesized from for analysis purposes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_class: Option<String>,
    /// Argument position label -> type name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_arguments: Option<BTreeMap<String, String>>,
}

impl IpaInfo {
    /// All type names this binding refers to
    pub fn type_refs(&self) -> impl Iterator<Item = &str> {
        self.from_class
            .as_deref()
            .into_iter()
            .chain(self.on_arguments.iter().flat_map(|args| args.values().map(String::as_str)))
    }
}

/// One schema entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    /// Direct parents, in declaration order
    #[serde(default)]
    pub bases: Vec<String>,
    /// Direct children
    #[serde(default)]
    pub derived: BTreeSet<String>,
    /// Declaration order is the emission order for generators
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub group: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pragmas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipa: Option<IpaInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_doc_name: Option<String>,
}

impl Class {
    /// Create an empty class with no bases
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            derived: BTreeSet::new(),
            properties: Vec::new(),
            group: String::new(),
            pragmas: Vec::new(),
            ipa: None,
            doc: Vec::new(),
            default_doc_name: None,
        }
    }

    /// Leaf of the hierarchy
    pub fn is_final(&self) -> bool {
        self.derived.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.bases.is_empty()
    }

    /// Look up a property by its (normalized) name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name.as_deref() == Some(name))
    }

    /// Verify every referenced type is in `known`
    pub fn check_types(&self, known: &HashSet<String>) -> Result<()> {
        let refs = self
            .bases
            .iter()
            .map(String::as_str)
            .chain(self.derived.iter().map(String::as_str))
            .chain(self.properties.iter().filter_map(|p| p.type_.as_deref()))
            .chain(self.ipa.iter().flat_map(|ipa| ipa.type_refs()));

        for t in refs {
            if !known.contains(t) {
                return Err(SchemaError::UnknownType(t.to_string()));
            }
        }
        Ok(())
    }
}
