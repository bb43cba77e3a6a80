//! Class Builder
//!
//! Turns one [`ClassDeclaration`] into a [`Class`], enforcing naming and
//! group rules. Groups are inherited by lookup through the declarations the
//! builder was created with, so a class without its own group takes the
//! group of its first base that has one.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::class::Class;
use crate::declaration::ClassDeclaration;
use crate::doc::split_doc;
use crate::error::{Result, SchemaError};
use crate::property::{build_property, PropertyModifier};

/// Whether a class may inherit from a class in another group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossGroupPolicy {
    /// Every base with a group must be in the class's own group
    #[default]
    Deny,
    /// Only bases disagreeing among themselves are rejected
    Allow,
}

pub struct ClassBuilder<'a> {
    declarations: HashMap<&'a str, &'a ClassDeclaration>,
    policy: CrossGroupPolicy,
}

impl<'a> ClassBuilder<'a> {
    pub fn new<I>(declarations: I, policy: CrossGroupPolicy) -> Self
    where
        I: IntoIterator<Item = &'a ClassDeclaration>,
    {
        Self {
            declarations: declarations.into_iter().map(|d| (d.name.as_str(), d)).collect(),
            policy,
        }
    }

    /// Group of `name`: its own, else the first base's resolved group
    pub fn resolve_group(&self, name: &str) -> Option<&'a str> {
        let mut visited = HashSet::new();
        self.lookup_group(name, &mut visited)
    }

    fn lookup_group(&self, name: &str, visited: &mut HashSet<&'a str>) -> Option<&'a str> {
        let decl: &'a ClassDeclaration = self.declarations.get(name).copied()?;
        // Cycles are reported by the sorter, not here
        if !visited.insert(decl.name.as_str()) {
            return None;
        }
        if let Some(group) = decl.group.as_deref() {
            return Some(group);
        }
        decl.bases.iter().find_map(|base| self.lookup_group(base, visited))
    }

    /// Build a class with `bases` filled and `derived` seeded from the
    /// declaration's known subclasses.
    pub fn build(&self, decl: &ClassDeclaration) -> Result<Class> {
        if !decl.name.chars().next().is_some_and(char::is_uppercase) {
            return Err(SchemaError::UncapitalizedName(decl.name.clone()));
        }

        let base_groups: BTreeSet<&str> = decl
            .bases
            .iter()
            .filter_map(|base| self.resolve_group(base))
            .collect();
        if base_groups.len() > 1 {
            return Err(SchemaError::MixedGroupBases(decl.name.clone()));
        }

        let group = decl
            .group
            .as_deref()
            .or_else(|| decl.bases.iter().find_map(|base| self.resolve_group(base)))
            .unwrap_or_default()
            .to_string();

        if self.policy == CrossGroupPolicy::Deny {
            self.check_base_groups(decl, &group)?;
        }

        let mut properties = Vec::with_capacity(decl.attributes.len());
        let mut seen = HashSet::with_capacity(decl.attributes.len());
        for attr in &decl.attributes {
            let pipeline = attr.pipeline();
            let modifiers: Vec<&dyn PropertyModifier> = pipeline.iter().map(|m| m.as_ref()).collect();
            let prop = build_property(attr.specifier.clone(), &modifiers)?;
            let name = prop.name.clone().unwrap_or_default();
            if !seen.insert(name.clone()) {
                return Err(SchemaError::DuplicateProperty {
                    class: decl.name.clone(),
                    property: name,
                });
            }
            properties.push(prop);
        }

        debug!(class = %decl.name, group = %group, properties = properties.len(), "built class");

        Ok(Class {
            name: decl.name.clone(),
            bases: decl.bases.clone(),
            derived: decl.subclasses.iter().cloned().collect(),
            properties,
            group,
            // Own pragmas/ipa/doc name only, never inherited from a base
            pragmas: decl.pragmas.clone(),
            ipa: decl.ipa.clone(),
            doc: split_doc(decl.doc.as_deref()),
            default_doc_name: decl.doc_name.clone(),
        })
    }

    fn check_base_groups(&self, decl: &ClassDeclaration, group: &str) -> Result<()> {
        for base in &decl.bases {
            // Ungrouped bases constrain nothing; undeclared ones fail as unknown types later
            let Some(base_group) = self.resolve_group(base) else {
                continue;
            };
            if base_group != group {
                return Err(SchemaError::CrossGroupBase {
                    class: decl.name.clone(),
                    base: base.clone(),
                    group: group.to_string(),
                    base_group: base_group.to_string(),
                });
            }
        }
        Ok(())
    }
}
