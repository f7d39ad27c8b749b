//! Schema values produced by the extractor and their JSON shape.
//!
//! A catalog serializes as an array of `[name, params]` pairs:
//!
//! ```json
//! [
//!   ["BoxGeometry", { "width": { "type": "number", "optional": true } }],
//!   ["ShaderMaterial", "ShaderMaterialParameters"],
//!   ["Fog", null]
//! ]
//! ```

use indexmap::IndexMap;
use paramscope_dts::Primitive;
use serde::{Deserialize, Serialize};

/// One normalized type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TagRepr", into = "TagRepr")]
pub enum TypeTag {
    /// A primitive keyword: `string`, `number`, ...
    Primitive(Primitive),
    /// A reference to a named type: `Color`, `Texture`.
    Reference(String),
    /// A qualified reference such as `THREE.Color`.
    Unresolved(String),
    /// Structural kind of a type form the normalizer does not model.
    Opaque(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Name(String),
    Unresolved { unresolved: String },
    Opaque { opaque: String },
}

impl From<TagRepr> for TypeTag {
    fn from(repr: TagRepr) -> Self {
        match repr {
            TagRepr::Name(name) => match Primitive::from_keyword(&name) {
                Some(primitive) => TypeTag::Primitive(primitive),
                None => TypeTag::Reference(name),
            },
            TagRepr::Unresolved { unresolved } => TypeTag::Unresolved(unresolved),
            TagRepr::Opaque { opaque } => TypeTag::Opaque(opaque),
        }
    }
}

impl From<TypeTag> for TagRepr {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Primitive(primitive) => TagRepr::Name(primitive.to_string()),
            TypeTag::Reference(name) => TagRepr::Name(name),
            TypeTag::Unresolved(unresolved) => TagRepr::Unresolved { unresolved },
            TypeTag::Opaque(opaque) => TagRepr::Opaque { opaque },
        }
    }
}

/// A member's normalized type: one tag, or the alternatives of a union in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSchema {
    Single(TypeTag),
    Union(Vec<TypeTag>),
}

impl TypeSchema {
    pub fn tags(&self) -> &[TypeTag] {
        match self {
            TypeSchema::Single(tag) => std::slice::from_ref(tag),
            TypeSchema::Union(tags) => tags,
        }
    }

    /// Whether any tag is an opaque fallback.
    pub fn is_opaque(&self) -> bool {
        self.tags().iter().any(|tag| matches!(tag, TypeTag::Opaque(_)))
    }
}

/// Schema of one constructor parameter or interface property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub ty: TypeSchema,
    #[serde(default)]
    pub optional: bool,
}

/// Member name to schema, in declaration order.
pub type ParameterMap = IndexMap<String, ParameterSchema>;

/// The parameter shape recorded for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityParams {
    Mapping(ParameterMap),
    /// Parameters are declared by an external type with this name.
    TypeNameRef(String),
    /// Neither a material nor a geometry.
    Unrecognized,
}

impl EntityParams {
    pub fn empty() -> Self {
        EntityParams::Mapping(ParameterMap::new())
    }

    pub fn as_mapping(&self) -> Option<&ParameterMap> {
        match self {
            EntityParams::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

/// One catalog entry, serialized as `[name, params]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, EntityParams)", into = "(String, EntityParams)")]
pub struct EntitySchema {
    pub name: String,
    pub params: EntityParams,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>, params: EntityParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

impl From<(String, EntityParams)> for EntitySchema {
    fn from((name, params): (String, EntityParams)) -> Self {
        Self { name, params }
    }
}

impl From<EntitySchema> for (String, EntityParams) {
    fn from(entity: EntitySchema) -> Self {
        (entity.name, entity.params)
    }
}

/// Entity schemas in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<EntitySchema>,
}

impl Catalog {
    pub fn entries(&self) -> &[EntitySchema] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntitySchema> {
        self.entries.iter()
    }

    /// The first entry with the given name.
    pub fn get(&self, name: &str) -> Option<&EntityParams> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.params)
    }
}

impl FromIterator<EntitySchema> for Catalog {
    fn from_iter<I: IntoIterator<Item = EntitySchema>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a EntitySchema;
    type IntoIter = std::slice::Iter<'a, EntitySchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn param(ty: TypeSchema, optional: bool) -> ParameterSchema {
        ParameterSchema { ty, optional }
    }

    #[test]
    fn test_type_tags_serialize_by_kind() {
        let tags = vec![
            TypeTag::Reference("Color".to_string()),
            TypeTag::Primitive(Primitive::String),
            TypeTag::Unresolved("THREE.Color".to_string()),
            TypeTag::Opaque("ArrayType".to_string()),
        ];
        let value = serde_json::to_value(TypeSchema::Union(tags)).unwrap();

        assert_eq!(
            value,
            json!(["Color", "string", {"unresolved": "THREE.Color"}, {"opaque": "ArrayType"}])
        );
    }

    #[test]
    fn test_primitive_names_read_back_as_primitives() {
        let tag: TypeTag = serde_json::from_value(json!("number")).unwrap();
        assert_eq!(tag, TypeTag::Primitive(Primitive::Number));

        let tag: TypeTag = serde_json::from_value(json!("Vector2")).unwrap();
        assert_eq!(tag, TypeTag::Reference("Vector2".to_string()));
    }

    #[test]
    fn test_entity_shapes() {
        let mut map = ParameterMap::new();
        map.insert(
            "width".to_string(),
            param(TypeSchema::Single(TypeTag::Primitive(Primitive::Number)), true),
        );
        let catalog: Catalog = vec![
            EntitySchema::new("BoxGeometry", EntityParams::Mapping(map)),
            EntitySchema::new(
                "ShaderMaterial",
                EntityParams::TypeNameRef("ShaderMaterialParameters".to_string()),
            ),
            EntitySchema::new("Fog", EntityParams::Unrecognized),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            serde_json::to_value(&catalog).unwrap(),
            json!([
                ["BoxGeometry", {"width": {"type": "number", "optional": true}}],
                ["ShaderMaterial", "ShaderMaterialParameters"],
                ["Fog", null]
            ])
        );
    }

    #[test]
    fn test_optional_defaults_to_false() {
        let schema: ParameterSchema = serde_json::from_value(json!({"type": "Color"})).unwrap();
        assert!(!schema.optional);
        assert_eq!(
            schema.ty,
            TypeSchema::Single(TypeTag::Reference("Color".to_string()))
        );
    }

    #[test]
    fn test_catalog_lookup_by_name() {
        let catalog: Catalog = vec![EntitySchema::new("MeshBasicMaterial", EntityParams::empty())]
            .into_iter()
            .collect();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("MeshBasicMaterial"), Some(&EntityParams::empty()));
        assert_eq!(catalog.get("MeshPhongMaterial"), None);
    }
}
