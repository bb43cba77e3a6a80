//! Raw declarations
//!
//! Plain records handed to the loader by whatever extracts them from a
//! source document. The loader never looks past these types.

use crate::class::IpaInfo;
use crate::error::Result;
use crate::property::{Child, Doc, Description, Named, Optional, Pragma, PropertyModifier, Repeated, Specifier};

/// Name bound to the include list by default
pub const INCLUDES_NAME: &str = "__includes";

/// One named top-level binding, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct RawDeclaration {
    pub name: String,
    pub body: DeclarationBody,
}

impl RawDeclaration {
    pub fn class(decl: ClassDeclaration) -> Self {
        Self {
            name: decl.name.clone(),
            body: DeclarationBody::Class(decl),
        }
    }

    pub fn includes(name: impl Into<String>, includes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            body: DeclarationBody::Includes(includes),
        }
    }

    /// A binding that is neither a class nor an include list
    pub fn other(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: DeclarationBody::Other(description.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationBody {
    Class(ClassDeclaration),
    Includes(Vec<String>),
    /// Anything else, with a short description for diagnostics
    Other(String),
}

/// A class as declared, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDeclaration {
    pub name: String,
    pub bases: Vec<String>,
    /// Subclasses known to the source up front; completed by the loader
    pub subclasses: Vec<String>,
    pub attributes: Vec<Attribute>,
    /// Own group only; inherited groups are resolved by the builder
    pub group: Option<String>,
    pub pragmas: Vec<String>,
    pub ipa: Option<IpaInfo>,
    pub doc: Option<String>,
    pub doc_name: Option<String>,
}

impl ClassDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_bases<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bases = bases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// Declared attribute: a specifier plus the modifiers written after it
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub specifier: Specifier,
    pub modifiers: Vec<Modifier>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, specifier: Specifier) -> Self {
        Self {
            name: name.into(),
            specifier,
            modifiers: Vec::new(),
        }
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Declared modifiers followed by the naming modifier
    pub fn pipeline(&self) -> Vec<Box<dyn PropertyModifier>> {
        let mut pipeline: Vec<Box<dyn PropertyModifier>> =
            self.modifiers.iter().map(Modifier::as_modifier).collect();
        pipeline.push(Box::new(Named(self.name.clone())));
        pipeline
    }
}

/// Modifiers a declaration can attach to an attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    Child,
    Optional,
    Repeated,
    Pragma(String),
    Doc(String),
    Description(String),
}

impl Modifier {
    fn as_modifier(&self) -> Box<dyn PropertyModifier> {
        match self {
            Modifier::Child => Box::new(Child),
            Modifier::Optional => Box::new(Optional),
            Modifier::Repeated => Box::new(Repeated),
            Modifier::Pragma(p) => Box::new(Pragma(p.clone())),
            Modifier::Doc(d) => Box::new(Doc(d.clone())),
            Modifier::Description(d) => Box::new(Description(d.clone())),
        }
    }
}

/// Extracts raw declarations from some source document
pub trait DeclarationSource {
    /// All top-level bindings, in source order
    fn declarations(&self) -> Result<Vec<RawDeclaration>>;

    /// Framework artifacts that are not schema declarations
    fn is_reserved(&self, name: &str) -> bool {
        name.starts_with("__")
    }
}

impl DeclarationSource for Vec<RawDeclaration> {
    fn declarations(&self) -> Result<Vec<RawDeclaration>> {
        Ok(self.clone())
    }
}
