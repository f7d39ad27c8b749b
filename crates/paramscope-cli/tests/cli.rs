//! Tests for the `paramscope` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::tempdir;

fn paramscope() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_paramscope"));
    cmd.env_remove("PARAMSCOPE_LOG");
    cmd
}

fn write(p: &Path, content: &str) {
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(p, content).unwrap();
}

/// A trimmed-down three.js `src/` tree with one material and one geometry.
fn three_tree(root: &Path) {
    write(
        &root.join("materials/Materials.d.ts"),
        "export * from './PointsMaterial.js';\nexport * from './ShaderMaterial.js';\n",
    );
    write(
        &root.join("materials/PointsMaterial.d.ts"),
        r#"
export interface PointsMaterialParameters extends MaterialParameters {
    color?: ColorRepresentation | undefined;
    size?: number | undefined;
}
export class PointsMaterial extends Material {
    constructor(parameters?: PointsMaterialParameters);
}
"#,
    );
    write(
        &root.join("materials/ShaderMaterial.d.ts"),
        r#"
export class ShaderMaterial extends Material {
    constructor(parameters?: ShaderMaterialParameters);
}
"#,
    );
    write(
        &root.join("geometries/Geometries.d.ts"),
        "export * from './PlaneGeometry.js';\n",
    );
    write(
        &root.join("geometries/PlaneGeometry.d.ts"),
        r#"
export class PlaneGeometry extends BufferGeometry {
    constructor(width?: number, height?: number, widthSegments?: number);
}
"#,
    );
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn build_writes_default_catalogs() {
    let dir = tempdir().unwrap();
    let three = dir.path().join("three/src");
    three_tree(&three);
    let out = dir.path().join("out");

    let output = paramscope()
        .current_dir(dir.path())
        .arg("build")
        .arg("--three-src")
        .arg(&three)
        .arg("--out-dir")
        .arg(&out)
        .output()
        .unwrap();
    assert_success(&output);

    assert_eq!(
        read_json(&out.join("materials.json")),
        json!([
            ["PointsMaterial", {
                "color": {"type": ["ColorRepresentation", "undefined"], "optional": true},
                "size": {"type": ["number", "undefined"], "optional": true}
            }],
            ["ShaderMaterial", "ShaderMaterialParameters"]
        ])
    );
    assert_eq!(
        read_json(&out.join("geometries.json")),
        json!([
            ["PlaneGeometry", {
                "width": {"type": "number", "optional": true},
                "height": {"type": "number", "optional": true},
                "widthSegments": {"type": "number", "optional": true}
            }]
        ])
    );
}

#[test]
fn failed_build_keeps_previous_output() {
    let dir = tempdir().unwrap();
    let three = dir.path().join("three/src");
    three_tree(&three);
    write(
        &three.join("materials/ShaderMaterial.d.ts"),
        "export class ShaderMaterial {\n    constructor(parameters?: );\n}\n",
    );
    let out = dir.path().join("out");
    write(&out.join("materials.json"), "[\"previous catalog\"]\n");

    let output = paramscope()
        .current_dir(dir.path())
        .arg("build")
        .arg("--three-src")
        .arg(&three)
        .arg("--out-dir")
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        fs::read_to_string(out.join("materials.json")).unwrap(),
        "[\"previous catalog\"]\n"
    );
    assert!(!out.join("geometries.json").exists());
}

#[test]
fn build_reads_config_file() {
    let dir = tempdir().unwrap();
    three_tree(&dir.path().join("vendor"));
    write(
        &dir.path().join("paramscope.toml"),
        r#"
[options]
output_dir = "schemas"

[[catalog]]
name = "geometry"
manifest = "vendor/geometries/Geometries.d.ts"
output = "geo.json"
"#,
    );

    let output = paramscope()
        .current_dir(dir.path())
        .arg("build")
        .output()
        .unwrap();
    assert_success(&output);

    let geo = read_json(&dir.path().join("schemas/geo.json"));
    assert_eq!(geo[0][0], "PlaneGeometry");
    assert!(!dir.path().join("schemas/materials.json").exists());
}

#[test]
fn catalog_prints_to_stdout() {
    let dir = tempdir().unwrap();
    three_tree(dir.path());

    let output = paramscope()
        .arg("catalog")
        .arg(dir.path().join("materials/Materials.d.ts"))
        .output()
        .unwrap();
    assert_success(&output);

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("[\n  [\n    \"PointsMaterial\""));
    let value: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value[1], json!(["ShaderMaterial", "ShaderMaterialParameters"]));
}

#[test]
fn catalog_reports_parse_errors_with_context() {
    let dir = tempdir().unwrap();
    three_tree(dir.path());
    write(
        &dir.path().join("geometries/PlaneGeometry.d.ts"),
        "export class PlaneGeometry {\n    constructor(width?: );\n}\n",
    );

    let output = paramscope()
        .arg("catalog")
        .arg(dir.path().join("geometries/Geometries.d.ts"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("PlaneGeometry.d.ts"), "stderr: {stderr}");
    assert!(stderr.contains("constructor(width?: );"), "stderr: {stderr}");
    assert!(stderr.contains("stage: parse"), "stderr: {stderr}");
}

#[test]
fn catalog_reports_missing_files() {
    let dir = tempdir().unwrap();

    let output = paramscope()
        .arg("catalog")
        .arg(dir.path().join("Materials.d.ts"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error[discovery]"), "stderr: {stderr}");
}

#[test]
fn flatten_writes_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("Box.d.ts");
    let out = dir.path().join("Box.ts");
    write(
        &input,
        "export class BoxGeometry {\n    constructor(width?: number);\n}\nexport * from './Other';\n",
    );

    let output = paramscope()
        .arg("flatten")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert_success(&output);

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "class BoxGeometry {\n    constructor(width?: number);\n}\nexport * from './Other';\n"
    );
}
