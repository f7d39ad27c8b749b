//! Member extraction into ordered parameter maps.

use paramscope_dts::{ConstructSignature, DtsInterface};

use crate::error::NormalizeError;
use crate::normalize::{normalize, Member};
use crate::resolve::Resolution;
use crate::schema::{EntityParams, ParameterMap};

/// A declaration whose members make up a parameter map.
#[derive(Debug, Clone, Copy)]
pub enum MemberSource<'a> {
    /// Constructor parameters, in order.
    Constructor(&'a ConstructSignature),
    /// Interface property signatures, in order.
    Interface(&'a DtsInterface),
}

impl<'a> MemberSource<'a> {
    fn members(self) -> Vec<Member<'a>> {
        match self {
            MemberSource::Constructor(sig) => sig.params.iter().map(Member::Param).collect(),
            MemberSource::Interface(iface) => iface.properties().map(Member::Property).collect(),
        }
    }
}

/// Normalize every member of `source` into a map keyed by member name.
///
/// A repeated name replaces the earlier schema but keeps its position.
pub fn extract(source: MemberSource<'_>) -> Result<ParameterMap, NormalizeError> {
    let mut map = ParameterMap::new();
    for member in source.members() {
        let (name, schema) = normalize(member)?;
        map.insert(name, schema);
    }
    Ok(map)
}

/// Turn a resolution into the parameters recorded in the catalog.
pub fn extract_entity(resolution: &Resolution<'_>) -> Result<EntityParams, NormalizeError> {
    let source = match resolution {
        Resolution::DirectInterface(iface) => MemberSource::Interface(*iface),
        Resolution::ClassWithNestedParams {
            params: Some(iface),
            ..
        } => MemberSource::Interface(*iface),
        Resolution::ClassDirectParams { constructor, .. } => MemberSource::Constructor(*constructor),
        Resolution::ClassWithNestedParams { params: None, .. } | Resolution::NotFound => {
            return Ok(EntityParams::empty())
        }
        Resolution::ClassExternalParams { type_name, .. } => {
            return Ok(EntityParams::TypeNameRef(type_name.clone()))
        }
        Resolution::Unrecognized => return Ok(EntityParams::Unrecognized),
    };

    extract(source).map(EntityParams::Mapping)
}
