//! Error types for schema extraction.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use paramscope_dts::ParseError;
use thiserror::Error;

/// A member could not be turned into a parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Declarations are expected to be fully typed.
    #[error("member `{member}` has no type annotation")]
    MissingAnnotation { member: String },
}

/// The target entity could not be located in its declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("class `{class}` matched for `{entity}` declares no constructor")]
    MissingConstructor { entity: String, class: String },

    #[error("constructor parameter `{param}` of `{entity}` is not a named type (found {kind})")]
    UnnamedParameterType {
        entity: String,
        param: String,
        kind: String,
    },
}

/// Pipeline stage at which a catalog build failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovery,
    Parse,
    Resolve,
    Extract,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discovery => "discovery",
            Stage::Parse => "parse",
            Stage::Resolve => "resolve",
            Stage::Extract => "extract",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

/// Errors that abort a catalog build.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The manifest or an entity's declaration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A declaration file is not valid declaration syntax.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source_code: String,
        #[source]
        source: ParseError,
    },

    #[error("failed to resolve `{entity}` in {}: {source}", path.display())]
    Resolve {
        entity: String,
        path: PathBuf,
        #[source]
        source: ResolveError,
    },

    #[error("failed to extract `{entity}` from {}: {source}", path.display())]
    Extract {
        entity: String,
        path: PathBuf,
        #[source]
        source: NormalizeError,
    },

    /// The finished catalog could not be written to its sink.
    #[error("failed to write catalog: {0}")]
    Write(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn stage(&self) -> Stage {
        match self {
            CatalogError::Read { .. } => Stage::Discovery,
            CatalogError::Parse { .. } => Stage::Parse,
            CatalogError::Resolve { .. } => Stage::Resolve,
            CatalogError::Extract { .. } => Stage::Extract,
            CatalogError::Write(_) => Stage::Write,
        }
    }

    /// The file being processed when the build failed, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            CatalogError::Read { path, .. }
            | CatalogError::Parse { path, .. }
            | CatalogError::Resolve { path, .. }
            | CatalogError::Extract { path, .. } => Some(path),
            CatalogError::Write(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_follows_variant() {
        let err = CatalogError::Resolve {
            entity: "MeshBasicMaterial".to_string(),
            path: PathBuf::from("materials/MeshBasicMaterial.d.ts"),
            source: ResolveError::MissingConstructor {
                entity: "MeshBasicMaterial".to_string(),
                class: "MeshBasicMaterial".to_string(),
            },
        };

        assert_eq!(err.stage(), Stage::Resolve);
        assert_eq!(err.stage().to_string(), "resolve");
        assert_eq!(
            err.path(),
            Some(Path::new("materials/MeshBasicMaterial.d.ts"))
        );
        assert_eq!(
            err.to_string(),
            "failed to resolve `MeshBasicMaterial` in materials/MeshBasicMaterial.d.ts: \
             class `MeshBasicMaterial` matched for `MeshBasicMaterial` declares no constructor"
        );
    }

    #[test]
    fn test_read_errors_belong_to_discovery() {
        let err = CatalogError::Read {
            path: PathBuf::from("Materials.d.ts"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };

        assert_eq!(err.stage(), Stage::Discovery);
        assert_eq!(err.to_string(), "failed to read Materials.d.ts: no such file");
    }
}
