//! Schema aggregate
//!
//! The [`Schema`] is what downstream generators consume. Iterating
//! `classes` yields groups in ascending tag order and, within a group, every
//! base before any class inheriting from it.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::class::Class;

/// Validated, ordered set of classes plus include references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Name -> class, in grouped topological order
    pub classes: IndexMap<String, Class>,
    /// External fragments merged into generated output
    #[serde(default)]
    pub includes: BTreeSet<String>,
}

impl Schema {
    pub fn new(classes: IndexMap<String, Class>, includes: BTreeSet<String>) -> Self {
        Self { classes, includes }
    }

    /// Get a class by name
    pub fn get(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in output order
    pub fn iter(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    /// Class names in output order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// The single class without bases
    pub fn root(&self) -> Option<&Class> {
        self.classes.values().find(|c| c.is_root())
    }

    /// Distinct group tags in output order
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for cls in self.classes.values() {
            if groups.last() != Some(&cls.group.as_str()) {
                groups.push(&cls.group);
            }
        }
        groups
    }

    /// All classes tagged with `group`, in output order
    pub fn classes_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Class> + 'a {
        self.classes.values().filter(move |c| c.group == group)
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Class;
    type IntoIter = indexmap::map::Values<'a, String, Class>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.values()
    }
}
