//! Constructor-parameter schema extraction for declaration files.
//!
//! The pipeline runs leaf-first:
//!
//! - [`normalize()`] turns one declared type into a [`TypeSchema`],
//! - [`extract()`] collects constructor parameters or interface
//!   properties into an ordered [`ParameterMap`],
//! - [`resolve()`] decides which declaration in a file describes an entity,
//! - [`CatalogBuilder`] walks a manifest and assembles the [`Catalog`].
//!
//! File access and parsing are injected through [`ContentProvider`] and
//! [`DeclarationParser`].

pub mod catalog;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod normalize;
pub mod resolve;
pub mod schema;
pub mod source;

pub use catalog::{read_catalog, write_catalog, CatalogBuilder, DEFAULT_DECLARATION_SUFFIX};
pub use error::{CatalogError, NormalizeError, ResolveError, Stage};
pub use extract::{extract, extract_entity, MemberSource};
pub use manifest::entry_names;
pub use normalize::{normalize, normalize_type, Member};
pub use resolve::{resolve, EntityKind, Resolution};
pub use schema::{
    Catalog, EntityParams, EntitySchema, ParameterMap, ParameterSchema, TypeSchema, TypeTag,
};
pub use source::{ContentProvider, DeclarationParser, DtsParser, FileSystemProvider, MemoryProvider};
