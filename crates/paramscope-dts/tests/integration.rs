//! Integration tests for paramscope-dts using three.js-like .d.ts samples.

use paramscope_dts::{flatten_exports, parse, ClassMember, DtsItem, DtsType, Primitive};

const MESH_STANDARD_MATERIAL: &str = r#"
import { Color, ColorRepresentation } from '../math/Color.js';
import { Texture } from '../textures/Texture.js';
import { Vector2 } from '../math/Vector2.js';
import { Material, MaterialParameters } from './Material.js';

export interface MeshStandardMaterialParameters extends MaterialParameters {
    color?: ColorRepresentation | undefined;
    roughness?: number | undefined;
    metalness?: number | undefined;
    map?: Texture | null | undefined;
    normalScale?: Vector2 | undefined;
    wireframe?: boolean | undefined;
    fog?: boolean | undefined;
}

export class MeshStandardMaterial extends Material {
    constructor(parameters?: MeshStandardMaterialParameters);

    /**
     * Read-only flag to check if a given object is of type {@link MeshStandardMaterial}.
     * @defaultValue `true`
     */
    readonly isMeshStandardMaterial: true;

    /**
     * @default { 'STANDARD': '' }
     */
    defines: { [key: string]: any };

    color: Color;
    roughness: number;
    map: Texture | null;

    setValues(parameters: MeshStandardMaterialParameters): void;
}
"#;

const BOX_GEOMETRY: &str = r#"
import { BufferGeometry } from '../core/BufferGeometry.js';

/**
 * {@link BoxGeometry} is a geometry class for a rectangular cuboid.
 */
export class BoxGeometry extends BufferGeometry {
    /**
     * Create a new instance of {@link BoxGeometry}
     * @param width Width; that is, the length of the edges parallel to the X axis. Optional; defaults to `1`.
     */
    constructor(
        width?: number,
        height?: number,
        depth?: number,
        widthSegments?: number,
        heightSegments?: number,
        depthSegments?: number,
    );

    override readonly type: string | "BoxGeometry";

    readonly parameters: {
        readonly width: number;
        readonly height: number;
        readonly depth: number;
    };

    static fromJSON(data: any): BoxGeometry;
}
"#;

#[test]
fn test_material_module() {
    let file = parse(MESH_STANDARD_MATERIAL).expect("failed to parse material module");

    let params = file
        .exported_interfaces()
        .find(|i| i.name == "MeshStandardMaterialParameters")
        .expect("parameters interface");
    let names: Vec<_> = params.properties().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        ["color", "roughness", "metalness", "map", "normalScale", "wireframe", "fog"]
    );
    assert!(params.properties().all(|p| p.optional));

    let class = file
        .exported_classes()
        .find(|c| c.name.contains("MeshStandardMaterial"))
        .expect("material class");
    assert!(matches!(
        &class.extends,
        Some(DtsType::Named { name, .. }) if name == "Material"
    ));
    assert!(matches!(class.members.first(), Some(ClassMember::Constructor(_))));
}

#[test]
fn test_geometry_module() {
    let file = parse(BOX_GEOMETRY).expect("failed to parse geometry module");

    let class = file.exported_classes().next().expect("geometry class");
    let ctor = class
        .members
        .iter()
        .find_map(|m| match m {
            ClassMember::Constructor(sig) => Some(sig),
            _ => None,
        })
        .expect("constructor");

    let names: Vec<_> = ctor.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        ["width", "height", "depth", "widthSegments", "heightSegments", "depthSegments"]
    );
    assert!(ctor
        .params
        .iter()
        .all(|p| p.optional && p.ty == Some(DtsType::Primitive(Primitive::Number))));
}

#[test]
fn test_barrel_module() {
    let src = r#"
export * from './ShadowMaterial.js';
export * from './SpriteMaterial.js';
export * from './RawShaderMaterial.js';
export { Material } from './Material.js';
"#;
    let file = parse(src).expect("failed to parse barrel module");

    assert_eq!(file.items.len(), 4);
    assert!(file.items.iter().all(|item| matches!(item, DtsItem::Export(_))));
    assert_eq!(file.exported_classes().count(), 0);
}

#[test]
fn test_flattened_module_still_parses() {
    let flattened = flatten_exports(BOX_GEOMETRY);
    let file = parse(&flattened).expect("failed to parse flattened module");

    assert_eq!(
        flattened.lines().count(),
        BOX_GEOMETRY.lines().count()
    );
    assert!(!flattened.contains("export class"));
    // Flattened declarations are no longer exported.
    assert_eq!(file.exported_classes().count(), 0);
    assert!(file
        .items
        .iter()
        .any(|item| matches!(item, DtsItem::Class(c) if c.name == "BoxGeometry")));
}
