//! Catalog building and persistence.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CatalogError;
use crate::extract::extract_entity;
use crate::manifest::entry_names;
use crate::resolve::{resolve, EntityKind};
use crate::schema::{Catalog, EntityParams, EntitySchema};
use crate::source::{ContentProvider, DeclarationParser, DtsParser, FileSystemProvider};

/// File suffix joined to each entity name to find its declaration file.
pub const DEFAULT_DECLARATION_SUFFIX: &str = ".d.ts";

/// Builds catalogs from a manifest and a folder of declaration files.
///
/// Reading and parsing go through the injected capabilities, so the whole
/// pipeline runs against a [`MemoryProvider`](crate::MemoryProvider) in tests.
#[derive(Debug, Clone)]
pub struct CatalogBuilder<P = FileSystemProvider, D = DtsParser> {
    provider: P,
    parser: D,
    suffix: String,
}

impl CatalogBuilder {
    /// A builder reading from disk with the bundled parser.
    pub fn new() -> Self {
        Self::with_capabilities(FileSystemProvider, DtsParser)
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ContentProvider, D: DeclarationParser> CatalogBuilder<P, D> {
    pub fn with_capabilities(provider: P, parser: D) -> Self {
        Self {
            provider,
            parser,
            suffix: DEFAULT_DECLARATION_SUFFIX.to_string(),
        }
    }

    pub fn declaration_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Path of the declaration file for `name` inside `base_folder`.
    pub fn declaration_path(&self, base_folder: &Path, name: &str) -> PathBuf {
        base_folder.join(format!("{name}{}", self.suffix))
    }

    /// Build the catalog for every entity the manifest names, in manifest order.
    ///
    /// The first failing entity aborts the build.
    pub fn build(&self, manifest_path: &Path, base_folder: &Path) -> Result<Catalog, CatalogError> {
        let manifest = self.read(manifest_path)?;
        let names = entry_names(&manifest);
        debug!(
            manifest = %manifest_path.display(),
            entries = names.len(),
            "discovered manifest entries"
        );

        let catalog = names
            .iter()
            .map(|name| self.build_entity(name, base_folder))
            .collect::<Result<Catalog, _>>()?;

        info!(
            manifest = %manifest_path.display(),
            entities = catalog.len(),
            "built catalog"
        );
        Ok(catalog)
    }

    /// Build one entity's schema from `<base_folder>/<name><suffix>`.
    pub fn build_entity(&self, name: &str, base_folder: &Path) -> Result<EntitySchema, CatalogError> {
        let path = self.declaration_path(base_folder, name);
        let source_code = self.read(&path)?;

        let kind = EntityKind::classify(name);
        if kind == EntityKind::Unrecognized {
            debug!(entity = name, "not a material or geometry, recording placeholder");
            return Ok(EntitySchema::new(name, EntityParams::Unrecognized));
        }

        let file = match self.parser.parse(&source_code) {
            Ok(file) => file,
            Err(source) => {
                return Err(CatalogError::Parse {
                    path,
                    source_code,
                    source,
                })
            }
        };

        let resolution = resolve(&file, name).map_err(|source| CatalogError::Resolve {
            entity: name.to_string(),
            path: path.clone(),
            source,
        })?;
        let params = extract_entity(&resolution).map_err(|source| CatalogError::Extract {
            entity: name.to_string(),
            path: path.clone(),
            source,
        })?;

        debug!(entity = name, ?kind, path = %path.display(), "extracted entity");
        Ok(EntitySchema::new(name, params))
    }

    /// Build a catalog and write it to `sink` as JSON.
    pub fn run<W: Write>(
        &self,
        manifest_path: &Path,
        base_folder: &Path,
        sink: W,
    ) -> Result<Catalog, CatalogError> {
        let catalog = self.build(manifest_path, base_folder)?;
        write_catalog(&catalog, sink)?;
        Ok(catalog)
    }

    fn read(&self, path: &Path) -> Result<String, CatalogError> {
        self.provider
            .read_file(path)
            .map_err(|source| CatalogError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Write a catalog as two-space indented JSON followed by a newline.
pub fn write_catalog<W: Write>(catalog: &Catalog, mut writer: W) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut writer, catalog)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)
}

/// Read a catalog written by [`write_catalog`].
pub fn read_catalog<R: Read>(reader: R) -> Result<Catalog, serde_json::Error> {
    serde_json::from_reader(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::source::MemoryProvider;

    fn builder(provider: MemoryProvider) -> CatalogBuilder<MemoryProvider, DtsParser> {
        CatalogBuilder::with_capabilities(provider, DtsParser)
    }

    #[test]
    fn test_declaration_path_uses_suffix() {
        let b = builder(MemoryProvider::new()).declaration_suffix(".ts");

        assert_eq!(
            b.declaration_path(Path::new("src/materials"), "LineBasicMaterial"),
            PathBuf::from("src/materials/LineBasicMaterial.ts")
        );
    }

    #[test]
    fn test_unrecognized_entities_are_not_parsed() {
        let provider = MemoryProvider::new()
            .with_file("lib/Index.d.ts", "export * from './Fog';")
            .with_file("lib/Fog.d.ts", "this is not a declaration {");

        let catalog = builder(provider)
            .build(Path::new("lib/Index.d.ts"), Path::new("lib"))
            .unwrap();

        assert_eq!(catalog.get("Fog"), Some(&EntityParams::Unrecognized));
    }

    #[test]
    fn test_missing_manifest_is_a_discovery_error() {
        let err = builder(MemoryProvider::new())
            .build(Path::new("Materials.d.ts"), Path::new("."))
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Discovery);
        assert_eq!(err.path(), Some(Path::new("Materials.d.ts")));
    }

    #[test]
    fn test_write_catalog_format() {
        let catalog: Catalog = vec![EntitySchema::new("Fog", EntityParams::Unrecognized)]
            .into_iter()
            .collect();
        let mut out = Vec::new();
        write_catalog(&catalog, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[\n  [\n    \"Fog\",\n    null\n  ]\n]\n"
        );
    }
}
