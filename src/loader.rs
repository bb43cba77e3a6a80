//! Schema Loading
//!
//! Builds the known-type universe, turns raw declarations into classes,
//! completes the derived sets, validates type references and hands the
//! result to the grouped topological sort. The first error aborts the load.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::builder::{ClassBuilder, CrossGroupPolicy};
use crate::class::Class;
use crate::declaration::{ClassDeclaration, DeclarationBody, DeclarationSource, RawDeclaration, INCLUDES_NAME};
use crate::error::{Result, SchemaError};
use crate::graph::toposort_classes_by_group;
use crate::schema::Schema;
use crate::source::DocumentSource;

/// Primitive type names known to every schema
pub const PRIMITIVES: [&str; 3] = ["int", "string", "boolean"];

/// Options for schema loading
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Type names accepted without a declaration
    pub primitives: Vec<String>,
    /// Extra names to skip, on top of the source's own reserved names
    pub reserved: Vec<String>,
    /// Declaration name carrying the include list
    pub includes_name: String,
    pub cross_group_bases: CrossGroupPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            primitives: PRIMITIVES.iter().map(|p| p.to_string()).collect(),
            reserved: Vec::new(),
            includes_name: INCLUDES_NAME.to_string(),
            cross_group_bases: CrossGroupPolicy::Deny,
        }
    }
}

/// Turns raw declarations into a validated [`Schema`]
#[derive(Debug, Clone, Default)]
pub struct Loader {
    options: LoadOptions,
}

impl Loader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load from declarations already in hand
    pub fn load(&self, declarations: &[RawDeclaration]) -> Result<Schema> {
        self.load_with(declarations, |name| name.starts_with("__"))
    }

    /// Extract declarations from `source`, then load them
    pub fn load_from_source(&self, source: &dyn DeclarationSource) -> Result<Schema> {
        let declarations = source.declarations()?;
        self.load_with(&declarations, |name| source.is_reserved(name))
    }

    /// Load a TOML or JSON schema document
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Schema> {
        let source = DocumentSource::open(path)?.with_includes_name(self.options.includes_name.clone());
        self.load_from_source(&source)
    }

    fn load_with(&self, declarations: &[RawDeclaration], source_reserved: impl Fn(&str) -> bool) -> Result<Schema> {
        let is_reserved = |name: &str| source_reserved(name) || self.options.reserved.iter().any(|r| r == name);
        let is_includes = |name: &str| name == self.options.includes_name;

        let mut known: HashSet<String> = self.options.primitives.iter().cloned().collect();
        known.extend(
            declarations
                .iter()
                .filter(|d| !is_includes(&d.name) && !is_reserved(&d.name))
                .map(|d| d.name.clone()),
        );

        let mut includes = BTreeSet::new();
        let mut class_decls: Vec<&ClassDeclaration> = Vec::with_capacity(declarations.len());
        for decl in declarations {
            // Checked before reserved names, the includes binding is usually reserved too
            if is_includes(&decl.name) {
                match &decl.body {
                    DeclarationBody::Includes(list) => includes.extend(list.iter().cloned()),
                    _ => return Err(SchemaError::NotAClass(decl.name.clone())),
                }
                continue;
            }
            if is_reserved(&decl.name) {
                debug!(name = %decl.name, "skipping reserved declaration");
                continue;
            }
            match &decl.body {
                DeclarationBody::Class(cls) if cls.name != decl.name => {
                    return Err(SchemaError::NotAClass(format!(
                        "{} (class {} bound under another name)",
                        decl.name, cls.name
                    )))
                }
                DeclarationBody::Class(cls) => class_decls.push(cls),
                DeclarationBody::Includes(_) => {
                    return Err(SchemaError::NotAClass(format!("{} (include list)", decl.name)))
                }
                DeclarationBody::Other(what) => {
                    return Err(SchemaError::NotAClass(format!("{} ({})", decl.name, what)))
                }
            }
        }

        if class_decls.is_empty() {
            warn!("schema declares no classes");
        }

        let builder = ClassBuilder::new(class_decls.iter().copied(), self.options.cross_group_bases);
        let mut classes: IndexMap<String, Class> = IndexMap::with_capacity(class_decls.len());
        let mut root: Option<&str> = None;
        for decl in &class_decls {
            let cls = builder.build(decl)?;
            if cls.is_root() {
                if root.is_some() {
                    return Err(SchemaError::SecondRoot(cls.name));
                }
                root = Some(decl.name.as_str());
            }
            if classes.contains_key(&cls.name) {
                return Err(SchemaError::DuplicateClass(cls.name));
            }
            classes.insert(cls.name.clone(), cls);
        }

        populate_derived(&mut classes);

        for cls in classes.values() {
            cls.check_types(&known)?;
        }

        let classes = toposort_classes_by_group(classes)?;
        let schema = Schema::new(classes, includes);
        info!(
            classes = schema.len(),
            groups = schema.groups().len(),
            includes = schema.includes.len(),
            root = root.unwrap_or_default(),
            "loaded schema"
        );
        Ok(schema)
    }
}

/// Invert the base relation into each class's `derived` set
fn populate_derived(classes: &mut IndexMap<String, Class>) {
    let edges: Vec<(String, String)> = classes
        .values()
        .flat_map(|cls| cls.bases.iter().map(|base| (base.clone(), cls.name.clone())))
        .collect();
    for (base, derived) in edges {
        if let Some(cls) = classes.get_mut(&base) {
            cls.derived.insert(derived);
        }
    }
}

/// Load declarations with default options
pub fn load(declarations: &[RawDeclaration]) -> Result<Schema> {
    Loader::default().load(declarations)
}

/// Load whatever `source` extracts, with default options
pub fn load_from_source(source: &dyn DeclarationSource) -> Result<Schema> {
    Loader::default().load_from_source(source)
}

/// Load a schema document from disk, with default options
pub fn load_file(path: impl AsRef<Path>) -> Result<Schema> {
    Loader::default().load_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::Attribute;
    use crate::property::Specifier;

    fn class(name: &str, bases: &[&str]) -> RawDeclaration {
        RawDeclaration::class(ClassDeclaration::new(name).with_bases(bases.iter().copied()))
    }

    #[test]
    fn test_root_then_child() {
        let schema = load(&[class("Root", &[]), class("Child", &["Root"])]).unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["Root", "Child"]);
        let root = schema.get("Root").unwrap();
        assert!(!root.is_final());
        assert!(root.derived.contains("Child"));
        assert!(schema.get("Child").unwrap().is_final());
    }

    #[test]
    fn test_second_root_rejected() {
        let err = load(&[class("Root", &[]), class("Other", &[])]).unwrap_err();
        assert!(matches!(err, SchemaError::SecondRoot(ref n) if n == "Other"));
        assert!(err.to_string().contains("Only one root class allowed"));
    }

    #[test]
    fn test_root_need_not_come_first() {
        let schema = load(&[class("Child", &["Root"]), class("Root", &[])]).unwrap();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["Root", "Child"]);
    }

    #[test]
    fn test_unknown_property_type() {
        let decl = ClassDeclaration::new("Root")
            .with_attribute(Attribute::new("x", Specifier::type_ref("Unknown")));
        let err = load(&[RawDeclaration::class(decl)]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType(ref t) if t == "Unknown"));
    }

    #[test]
    fn test_unknown_base() {
        let err = load(&[class("Root", &[]), class("Child", &["Missing"])]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType(ref t) if t == "Missing"));
    }

    #[test]
    fn test_declared_subclass_must_exist() {
        let mut decl = ClassDeclaration::new("Root");
        decl.subclasses.push("Phantom".to_string());
        let err = load(&[RawDeclaration::class(decl)]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType(ref t) if t == "Phantom"));
    }

    #[test]
    fn test_includes_and_reserved() {
        let decls = [
            RawDeclaration::includes(INCLUDES_NAME, vec!["prefix.dbscheme".to_string()]),
            RawDeclaration::other("__doc__", "module docstring"),
            class("Root", &[]),
        ];
        let schema = load(&decls).unwrap();
        assert_eq!(schema.includes.iter().collect::<Vec<_>>(), vec!["prefix.dbscheme"]);
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_reserved_names_are_not_types() {
        let decl = ClassDeclaration::new("Root")
            .with_attribute(Attribute::new("x", Specifier::type_ref("__helper")));
        let decls = [RawDeclaration::other("__helper", "function"), RawDeclaration::class(decl)];
        assert!(matches!(load(&decls), Err(SchemaError::UnknownType(t)) if t == "__helper"));
    }

    #[test]
    fn test_non_class_rejected() {
        let err = load(&[class("Root", &[]), RawDeclaration::other("CONSTANT", "integer 42")]).unwrap_err();
        assert!(matches!(err, SchemaError::NotAClass(ref n) if n.starts_with("CONSTANT")));
    }

    #[test]
    fn test_class_bound_under_another_name_rejected() {
        let decls = [
            class("Root", &[]),
            RawDeclaration {
                name: "Alias".to_string(),
                body: DeclarationBody::Class(ClassDeclaration::new("Real").with_bases(["Root"])),
            },
        ];
        let err = load(&decls).unwrap_err();
        assert!(matches!(err, SchemaError::NotAClass(ref n) if n.starts_with("Alias") && n.contains("Real")));
    }

    #[test]
    fn test_duplicate_class_rejected() {
        let err = load(&[class("Root", &[]), class("Child", &["Root"]), class("Child", &["Root"])]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateClass(ref n) if n == "Child"));
    }

    #[test]
    fn test_extra_reserved_and_primitives() {
        let decl = ClassDeclaration::new("Root")
            .with_attribute(Attribute::new("when", Specifier::type_ref("date")));
        let decls = [RawDeclaration::other("helpers", "module"), RawDeclaration::class(decl)];

        assert!(load(&decls).is_err());

        let loader = Loader::new(LoadOptions {
            primitives: vec!["int".into(), "string".into(), "boolean".into(), "date".into()],
            reserved: vec!["helpers".into()],
            ..LoadOptions::default()
        });
        let schema = loader.load(&decls).unwrap();
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_empty_schema() {
        let schema = load(&[]).unwrap();
        assert!(schema.is_empty());
        assert!(schema.root().is_none());
    }
}
