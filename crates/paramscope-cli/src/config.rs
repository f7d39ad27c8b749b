//! Project configuration (paramscope.toml) parsing and types.

use std::fs;
use std::path::{Path, PathBuf};

use paramscope_core::DEFAULT_DECLARATION_SUFFIX;
use serde::Deserialize;

/// File name looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "paramscope.toml";

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration structure for paramscope.toml.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ParamscopeConfig {
    /// Options shared by every catalog.
    #[serde(default)]
    pub options: OptionsConfig,
    /// Catalogs to build, in order.
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

/// Global options section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OptionsConfig {
    /// Directory catalogs are written into.
    pub output_dir: Option<String>,
    /// Suffix joined to entity names to find declaration files.
    pub declaration_suffix: Option<String>,
}

/// One catalog to build.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Catalog name, used for the default output file.
    pub name: String,
    /// Manifest (barrel) file listing the entities.
    pub manifest: String,
    /// Folder holding the entity declaration files.
    pub base_dir: Option<String>,
    /// Output file name inside the output directory.
    pub output: Option<String>,
}

impl ParamscopeConfig {
    /// Load paramscope.toml from the current directory.
    /// Returns None if the file doesn't exist.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from_path(path).map(Some)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The materials and geometries catalogs of a three.js source tree.
    pub fn three_defaults(three_src: &Path) -> Self {
        let entry = |name: &str, folder: &str, manifest: &str| {
            let base = three_src.join(folder);
            CatalogEntry {
                name: name.to_string(),
                manifest: base.join(manifest).display().to_string(),
                base_dir: Some(base.display().to_string()),
                output: None,
            }
        };

        Self {
            options: OptionsConfig::default(),
            catalog: vec![
                entry("materials", "materials", "Materials.d.ts"),
                entry("geometries", "geometries", "Geometries.d.ts"),
            ],
        }
    }
}

impl OptionsConfig {
    /// Get the output directory, defaulting to ".".
    pub fn output_dir(&self) -> &str {
        self.output_dir.as_deref().unwrap_or(".")
    }

    /// Get the declaration suffix, defaulting to ".d.ts".
    pub fn declaration_suffix(&self) -> &str {
        self.declaration_suffix
            .as_deref()
            .unwrap_or(DEFAULT_DECLARATION_SUFFIX)
    }
}

impl CatalogEntry {
    pub fn manifest_path(&self) -> PathBuf {
        PathBuf::from(&self.manifest)
    }

    /// Folder of entity files; the manifest's own folder unless configured.
    pub fn base_dir(&self) -> PathBuf {
        match &self.base_dir {
            Some(dir) => PathBuf::from(dir),
            None => manifest_folder(&self.manifest_path()),
        }
    }

    /// Output file name, defaulting to `<name>.json`.
    pub fn output_file(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}.json", self.name))
    }
}

/// Parent folder of a manifest, `.` for a bare file name.
pub fn manifest_folder(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[options]
output_dir = "schemas"
declaration_suffix = ".ts"

[[catalog]]
name = "materials"
manifest = "node_modules/three/src/materials/Materials.d.ts"

[[catalog]]
name = "geometries"
manifest = "vendor/Geometries.d.ts"
base_dir = "vendor/geometries"
output = "geo.json"
"#;
        let config = ParamscopeConfig::parse(toml).unwrap();
        assert_eq!(config.options.output_dir(), "schemas");
        assert_eq!(config.options.declaration_suffix(), ".ts");
        assert_eq!(config.catalog.len(), 2);

        let materials = &config.catalog[0];
        assert_eq!(
            materials.base_dir(),
            PathBuf::from("node_modules/three/src/materials")
        );
        assert_eq!(materials.output_file(), "materials.json");

        let geometries = &config.catalog[1];
        assert_eq!(geometries.base_dir(), PathBuf::from("vendor/geometries"));
        assert_eq!(geometries.output_file(), "geo.json");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = ParamscopeConfig::parse("").unwrap();
        assert!(config.catalog.is_empty());
        assert_eq!(config.options.output_dir(), ".");
        assert_eq!(config.options.declaration_suffix(), ".d.ts");
    }

    #[test]
    fn test_catalog_requires_manifest() {
        let toml = r#"
[[catalog]]
name = "materials"
"#;
        assert!(ParamscopeConfig::parse(toml).is_err());
    }

    #[test]
    fn test_three_defaults() {
        let config = ParamscopeConfig::three_defaults(Path::new("three/src"));
        let names: Vec<_> = config.catalog.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["materials", "geometries"]);

        let geometries = &config.catalog[1];
        assert_eq!(
            geometries.manifest_path(),
            PathBuf::from("three/src/geometries/Geometries.d.ts")
        );
        assert_eq!(geometries.base_dir(), PathBuf::from("three/src/geometries"));
    }

    #[test]
    fn test_manifest_folder_of_bare_name() {
        assert_eq!(manifest_folder(Path::new("Materials.d.ts")), PathBuf::from("."));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[options]\noutput_dir = \"out\"\n").unwrap();

        let config = ParamscopeConfig::load_from_path(&path).unwrap();
        assert_eq!(config.options.output_dir(), "out");

        fs::write(&path, "[options\n").unwrap();
        let err = ParamscopeConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let missing = ParamscopeConfig::load_from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
