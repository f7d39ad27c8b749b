//! Entity discovery from manifest (barrel) files.

use once_cell::sync::Lazy;
use regex::Regex;

static ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\./\w+").expect("manifest entry pattern is valid"));

/// Logical entity names referenced by `./<name>` tokens, in order of appearance.
///
/// Only word characters are taken, so `./MeshBasicMaterial.js` yields
/// `MeshBasicMaterial` and a nested `./nodes/Foo` yields `nodes`.
pub fn entry_names(manifest: &str) -> Vec<String> {
    ENTRY
        .find_iter(manifest)
        .map(|m| m.as_str()["./".len()..].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barrel_exports() {
        let manifest = "export * from './MeshBasicMaterial'; export * from './MeshPhongMaterial';";

        assert_eq!(
            entry_names(manifest),
            ["MeshBasicMaterial", "MeshPhongMaterial"]
        );
    }

    #[test]
    fn test_extensions_and_named_exports() {
        let manifest = r#"
            export * from './ShadowMaterial.js';
            export { Material } from "./Material.js";
        "#;

        assert_eq!(entry_names(manifest), ["ShadowMaterial", "Material"]);
    }

    #[test]
    fn test_parent_paths_match_their_tail() {
        let manifest = "import { Foo } from '../core/Foo.js';";

        assert_eq!(entry_names(manifest), ["core"]);
    }

    #[test]
    fn test_no_entries() {
        assert!(entry_names("export {};\n// nothing here").is_empty());
    }
}
