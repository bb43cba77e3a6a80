//! Class Schema
//!
//! Front-end for class-hierarchy schemas describing an AST. Declarations
//! (from a schema document or built in code) are validated and turned into
//! a [`Schema`] that code generators consume.
//!
//! ## Features
//!
//! - **Property Modifiers**: `optional`, `repeated`, `child`, pragmas and docs
//!   compose onto a property in declaration order
//! - **Grouped Ordering**: classes come out grouped by tag, every base before
//!   the classes inheriting from it
//! - **Type Checking**: bases, subclasses, property types and IPA references
//!   must name a declared class or a primitive
//! - **Document Sources**: TOML and JSON schema documents
//!
//! ## Pipeline
//!
//! ```text
//! schema.toml ──► DocumentSource ──► RawDeclaration*
//!                                         │
//!                                         ▼
//!                 ClassBuilder ◄──── Loader ────► toposort_classes_by_group
//!                                         │
//!                                         ▼
//!                                      Schema
//! ```

pub mod builder;
pub mod class;
pub mod config;
pub mod declaration;
pub mod doc;
pub mod error;
pub mod graph;
pub mod loader;
pub mod property;
pub mod schema;
pub mod source;

pub use builder::{ClassBuilder, CrossGroupPolicy};
pub use class::{Class, IpaInfo};
pub use config::SchemaConfig;
pub use declaration::{Attribute, ClassDeclaration, DeclarationSource, Modifier, RawDeclaration};
pub use doc::split_doc;
pub use error::{Result, SchemaError};
pub use graph::toposort_classes_by_group;
pub use loader::{load, load_file, load_from_source, LoadOptions, Loader};
pub use property::{build_property, Property, PropertyKind, PropertyModifier, Specifier};
pub use schema::Schema;
pub use source::DocumentSource;
