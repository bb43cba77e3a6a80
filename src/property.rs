//! Property model
//!
//! A [`Property`] is built from a terse [`Specifier`] (a type reference, the
//! predicate marker, or an existing property) and then adjusted by a list of
//! single-purpose [`PropertyModifier`]s applied in order.

use serde::{Deserialize, Serialize};

use crate::doc::split_doc;
use crate::error::{Result, SchemaError};

/// Cardinality of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Exactly one value
    Single,
    /// Ordered sequence of values
    Repeated,
    /// Zero or one value
    Optional,
    /// Ordered sequence that may be entirely absent (not the same as empty)
    RepeatedOptional,
    /// Boolean flag, carries no type
    Predicate,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Single => "single",
            PropertyKind::Repeated => "repeated",
            PropertyKind::Optional => "optional",
            PropertyKind::RepeatedOptional => "repeated_optional",
            PropertyKind::Predicate => "predicate",
        }
    }
}

/// One typed attribute of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Primitive or class name; `None` only for predicates
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    /// Owned (contained) rather than referenced
    #[serde(default)]
    pub is_child: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pragmas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
}

impl Property {
    fn with_kind(kind: PropertyKind, type_: Option<String>) -> Self {
        Self {
            kind,
            name: None,
            type_,
            is_child: false,
            pragmas: Vec::new(),
            doc: None,
            description: Vec::new(),
        }
    }

    /// Single-valued property of the given type
    pub fn single(type_: impl Into<String>) -> Self {
        Self::with_kind(PropertyKind::Single, Some(type_.into()))
    }

    pub fn optional(type_: impl Into<String>) -> Self {
        Self::with_kind(PropertyKind::Optional, Some(type_.into()))
    }

    pub fn repeated(type_: impl Into<String>) -> Self {
        Self::with_kind(PropertyKind::Repeated, Some(type_.into()))
    }

    pub fn repeated_optional(type_: impl Into<String>) -> Self {
        Self::with_kind(PropertyKind::RepeatedOptional, Some(type_.into()))
    }

    /// Boolean flag property
    pub fn predicate() -> Self {
        Self::with_kind(PropertyKind::Predicate, None)
    }

    pub fn is_single(&self) -> bool {
        self.kind == PropertyKind::Single
    }

    pub fn is_optional(&self) -> bool {
        matches!(self.kind, PropertyKind::Optional | PropertyKind::RepeatedOptional)
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self.kind, PropertyKind::Repeated | PropertyKind::RepeatedOptional)
    }

    pub fn is_predicate(&self) -> bool {
        self.kind == PropertyKind::Predicate
    }

    /// Name for diagnostics, falls back to the type
    fn label(&self) -> String {
        match (&self.name, &self.type_) {
            (Some(name), _) => format!("property {}", name),
            (None, Some(t)) => format!("{} property of type {}", self.kind.as_str(), t),
            (None, None) => format!("{} property", self.kind.as_str()),
        }
    }
}

/// What a property declaration starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// Bare type reference, becomes a single-valued property
    Type(String),
    /// The predicate marker
    Predicate,
    /// An already built property
    Property(Property),
}

impl Specifier {
    pub fn type_ref(name: impl Into<String>) -> Self {
        Specifier::Type(name.into())
    }

    /// Materialize the specifier into a property
    pub fn into_property(self) -> Result<Property> {
        match self {
            Specifier::Type(t) if t.trim().is_empty() => {
                Err(SchemaError::IllegalSpecifier(format!("{:?}", t)))
            }
            Specifier::Type(t) => Ok(Property::single(t)),
            Specifier::Predicate => Ok(Property::predicate()),
            Specifier::Property(p) if p.type_.is_none() != p.is_predicate() => {
                Err(SchemaError::IllegalSpecifier(format!(
                    "{} with {}",
                    p.label(),
                    if p.is_predicate() { "a type" } else { "no type" }
                )))
            }
            Specifier::Property(p) => Ok(p),
        }
    }
}

impl From<Property> for Specifier {
    fn from(p: Property) -> Self {
        Specifier::Property(p)
    }
}

/// In-place adjustment of a property
pub trait PropertyModifier: std::fmt::Debug {
    fn modify(&self, prop: &mut Property) -> Result<()>;
}

/// Build a property from a specifier and apply `modifiers` left to right.
pub fn build_property(
    spec: Specifier,
    modifiers: &[&dyn PropertyModifier],
) -> Result<Property> {
    let mut prop = spec.into_property()?;
    for modifier in modifiers {
        modifier.modify(&mut prop)?;
    }
    Ok(prop)
}

/// Sets the property name, dropping one trailing underscore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named(pub String);

impl PropertyModifier for Named {
    fn modify(&self, prop: &mut Property) -> Result<()> {
        let name = self.0.strip_suffix('_').unwrap_or(&self.0);
        prop.name = Some(name.to_string());
        Ok(())
    }
}

/// Marks the property as owning its value(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Child;

impl PropertyModifier for Child {
    fn modify(&self, prop: &mut Property) -> Result<()> {
        prop.is_child = true;
        Ok(())
    }
}

/// Single -> Optional, Repeated -> RepeatedOptional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Optional;

impl PropertyModifier for Optional {
    fn modify(&self, prop: &mut Property) -> Result<()> {
        prop.kind = match prop.kind {
            PropertyKind::Single => PropertyKind::Optional,
            PropertyKind::Repeated => PropertyKind::RepeatedOptional,
            _ => {
                return Err(SchemaError::IllegalModifier {
                    modifier: "optional",
                    detail: prop.label(),
                })
            }
        };
        Ok(())
    }
}

/// Single -> Repeated, Optional -> RepeatedOptional
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeated;

impl PropertyModifier for Repeated {
    fn modify(&self, prop: &mut Property) -> Result<()> {
        prop.kind = match prop.kind {
            PropertyKind::Single => PropertyKind::Repeated,
            PropertyKind::Optional => PropertyKind::RepeatedOptional,
            _ => {
                return Err(SchemaError::IllegalModifier {
                    modifier: "repeated",
                    detail: prop.label(),
                })
            }
        };
        Ok(())
    }
}

/// Appends a generator pragma
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma(pub String);

impl PropertyModifier for Pragma {
    fn modify(&self, prop: &mut Property) -> Result<()> {
        if !prop.pragmas.contains(&self.0) {
            prop.pragmas.push(self.0.clone());
        }
        Ok(())
    }
}

/// Short summary used by generated documentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc(pub String);

impl PropertyModifier for Doc {
    fn modify(&self, prop: &mut Property) -> Result<()> {
        prop.doc = Some(self.0.clone());
        Ok(())
    }
}

/// Multi-line description, normalized like a docstring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(pub String);

impl PropertyModifier for Description {
    fn modify(&self, prop: &mut Property) -> Result<()> {
        prop.description = split_doc(Some(&self.0));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_builds_single() {
        let prop = build_property(Specifier::type_ref("int"), &[]).unwrap();
        assert_eq!(prop.kind, PropertyKind::Single);
        assert_eq!(prop.type_.as_deref(), Some("int"));
        assert_eq!(prop.name, None);
    }

    #[test]
    fn test_predicate_has_no_type() {
        let prop = build_property(Specifier::Predicate, &[&Named("is_static".into())]).unwrap();
        assert!(prop.is_predicate());
        assert!(prop.type_.is_none());
        assert_eq!(prop.name.as_deref(), Some("is_static"));
    }

    #[test]
    fn test_existing_property_is_reused() {
        let base = Property::repeated("Expr");
        let prop = build_property(base.clone().into(), &[&Child]).unwrap();
        assert_eq!(prop.kind, PropertyKind::Repeated);
        assert!(prop.is_child);
        assert_eq!(prop.type_, base.type_);
    }

    #[test]
    fn test_existing_property_must_keep_type_iff_not_predicate() {
        let mut untyped = Property::single("int");
        untyped.type_ = None;
        let err = build_property(untyped.into(), &[]).unwrap_err();
        assert!(matches!(err, SchemaError::IllegalSpecifier(ref s) if s.contains("no type")));

        let mut typed_predicate = Property::predicate();
        typed_predicate.type_ = Some("int".to_string());
        let err = build_property(typed_predicate.into(), &[]).unwrap_err();
        assert!(matches!(err, SchemaError::IllegalSpecifier(ref s) if s.contains("a type")));
    }

    #[test]
    fn test_blank_type_is_illegal() {
        let err = build_property(Specifier::type_ref("  "), &[]).unwrap_err();
        assert!(matches!(err, SchemaError::IllegalSpecifier(_)));
    }

    #[test]
    fn test_trailing_underscore_stripped() {
        let prop = build_property(Specifier::type_ref("string"), &[&Named("class_".into())]).unwrap();
        assert_eq!(prop.name.as_deref(), Some("class"));

        let prop = build_property(Specifier::type_ref("string"), &[&Named("name".into())]).unwrap();
        assert_eq!(prop.name.as_deref(), Some("name"));
    }

    #[test]
    fn test_cardinality_modifiers_compose() {
        let prop = build_property(Specifier::type_ref("Stmt"), &[&Repeated, &Optional]).unwrap();
        assert_eq!(prop.kind, PropertyKind::RepeatedOptional);
        assert!(prop.is_repeated());
        assert!(prop.is_optional());

        let prop = build_property(Specifier::type_ref("Stmt"), &[&Optional, &Repeated]).unwrap();
        assert_eq!(prop.kind, PropertyKind::RepeatedOptional);
    }

    #[test]
    fn test_cardinality_on_predicate_rejected() {
        let err = build_property(Specifier::Predicate, &[&Named("flag".into()), &Optional]).unwrap_err();
        assert!(matches!(err, SchemaError::IllegalModifier { modifier: "optional", .. }));

        let err = build_property(Specifier::type_ref("int"), &[&Optional, &Optional]).unwrap_err();
        assert!(matches!(err, SchemaError::IllegalModifier { .. }));
    }

    #[test]
    fn test_metadata_modifiers() {
        let prop = build_property(
            Specifier::type_ref("Decl"),
            &[
                &Pragma("qltest_skip".into()),
                &Pragma("qltest_skip".into()),
                &Doc("declaration of this node".into()),
                &Description("First line\n    second line".into()),
            ],
        )
        .unwrap();
        assert_eq!(prop.pragmas, vec!["qltest_skip"]);
        assert_eq!(prop.doc.as_deref(), Some("declaration of this node"));
        assert_eq!(prop.description, vec!["First line", "second line"]);
    }

    #[test]
    fn test_type_present_iff_not_predicate() {
        let props = [
            Property::single("int"),
            Property::optional("int"),
            Property::repeated("int"),
            Property::repeated_optional("int"),
            Property::predicate(),
        ];
        for p in props {
            assert_eq!(p.type_.is_none(), p.kind == PropertyKind::Predicate);
        }
    }
}
