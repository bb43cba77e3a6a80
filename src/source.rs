//! Schema document source
//!
//! Reads a schema document (TOML or JSON) and turns it into raw
//! declarations for the loader.
//!
//! ## Example document (schema.toml):
//! ```toml
//! includes = ["prefix.dbscheme"]
//!
//! [[classes]]
//! name = "Element"
//! doc = "Root of the hierarchy."
//!
//! [[classes]]
//! name = "Expr"
//! bases = ["Element"]
//!
//! [[classes]]
//! name = "CallExpr"
//! bases = ["Expr"]
//! properties = [
//!     { name = "callee", type = "Expr", child = true },
//!     { name = "arguments", type = "Expr", repeated = true, child = true },
//!     { name = "is_implicit", predicate = true },
//! ]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::class::IpaInfo;
use crate::declaration::{
    Attribute, ClassDeclaration, DeclarationSource, Modifier, RawDeclaration, INCLUDES_NAME,
};
use crate::error::{Result, SchemaError};
use crate::property::Specifier;

/// Format of a schema document, from its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(DocumentFormat::Toml),
            Some("json") => Ok(DocumentFormat::Json),
            _ => Err(SchemaError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// A whole schema document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
    /// Any other top-level binding; rejected by the loader
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SchemaDocument {
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self> {
        Ok(match format {
            DocumentFormat::Toml => toml::from_str(content)?,
            DocumentFormat::Json => serde_json::from_str(content)?,
        })
    }
}

/// One `[[classes]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassEntry {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub subclasses: Vec<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub pragmas: Vec<String>,
    #[serde(default)]
    pub ipa: Option<IpaInfo>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub doc_name: Option<String>,
    /// Declaration order is kept
    #[serde(default)]
    pub properties: Vec<PropertyEntry>,
}

impl ClassEntry {
    fn to_declaration(&self) -> Result<ClassDeclaration> {
        let attributes = self
            .properties
            .iter()
            .map(|p| p.to_attribute(&self.name))
            .collect::<Result<Vec<_>>>()?;

        Ok(ClassDeclaration {
            name: self.name.clone(),
            bases: self.bases.clone(),
            subclasses: self.subclasses.clone(),
            attributes,
            group: self.group.clone(),
            pragmas: self.pragmas.clone(),
            ipa: self.ipa.clone(),
            doc: self.doc.clone(),
            doc_name: self.doc_name.clone(),
        })
    }
}

/// One property entry of a class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub predicate: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub repeated: bool,
    #[serde(default)]
    pub child: bool,
    #[serde(default)]
    pub pragmas: Vec<String>,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
}

impl PropertyEntry {
    fn specifier(&self, class: &str) -> Result<Specifier> {
        match (&self.type_, self.predicate) {
            (Some(t), false) => Ok(Specifier::Type(t.clone())),
            (None, true) => Ok(Specifier::Predicate),
            (Some(t), true) => Err(SchemaError::IllegalSpecifier(format!(
                "{}.{}: predicate with type {}",
                class, self.name, t
            ))),
            (None, false) => Err(SchemaError::IllegalSpecifier(format!(
                "{}.{}: neither type nor predicate",
                class, self.name
            ))),
        }
    }

    fn to_attribute(&self, class: &str) -> Result<Attribute> {
        let mut attr = Attribute::new(self.name.clone(), self.specifier(class)?);
        if self.repeated {
            attr = attr.with(Modifier::Repeated);
        }
        if self.optional {
            attr = attr.with(Modifier::Optional);
        }
        if self.child {
            attr = attr.with(Modifier::Child);
        }
        for pragma in &self.pragmas {
            attr = attr.with(Modifier::Pragma(pragma.clone()));
        }
        if let Some(doc) = &self.doc {
            attr = attr.with(Modifier::Doc(doc.clone()));
        }
        if let Some(desc) = &self.desc {
            attr = attr.with(Modifier::Description(desc.clone()));
        }
        Ok(attr)
    }
}

fn describe(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "table",
    }
}

/// Declaration source backed by a schema document
#[derive(Debug, Clone)]
pub struct DocumentSource {
    path: Option<PathBuf>,
    document: SchemaDocument,
    reserved: Vec<String>,
    includes_name: String,
}

impl DocumentSource {
    /// Read and parse the document at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        let document = SchemaDocument::parse(&content, format)?;
        debug!(path = %path.display(), classes = document.classes.len(), "read schema document");

        let mut source = Self::from_document(document);
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    pub fn from_document(document: SchemaDocument) -> Self {
        Self {
            path: None,
            document,
            reserved: Vec::new(),
            includes_name: INCLUDES_NAME.to_string(),
        }
    }

    /// Extra names treated as framework artifacts
    pub fn with_reserved(mut self, reserved: impl IntoIterator<Item = String>) -> Self {
        self.reserved.extend(reserved);
        self
    }

    /// Binding name the include list is reported under
    pub fn with_includes_name(mut self, name: impl Into<String>) -> Self {
        self.includes_name = name.into();
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }
}

impl DeclarationSource for DocumentSource {
    fn declarations(&self) -> Result<Vec<RawDeclaration>> {
        let doc = &self.document;
        let mut declarations = Vec::with_capacity(doc.classes.len() + doc.extra.len() + 1);

        declarations.push(RawDeclaration::includes(self.includes_name.clone(), doc.includes.clone()));
        for (name, value) in &doc.extra {
            declarations.push(RawDeclaration::other(name.clone(), describe(value)));
        }
        for entry in &doc.classes {
            declarations.push(RawDeclaration::class(entry.to_declaration()?));
        }
        Ok(declarations)
    }

    fn is_reserved(&self, name: &str) -> bool {
        name.starts_with("__") || self.reserved.iter().any(|r| r == name)
    }
}
