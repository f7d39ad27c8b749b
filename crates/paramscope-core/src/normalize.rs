//! Type normalization for individual members.

use paramscope_dts::{DtsType, Param, PropertyMember};

use crate::error::NormalizeError;
use crate::schema::{ParameterSchema, TypeSchema, TypeTag};

/// A member whose declared type becomes a parameter schema.
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    /// A constructor or function parameter.
    Param(&'a Param),
    /// An interface property signature.
    Property(&'a PropertyMember),
}

impl<'a> Member<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Member::Param(param) => &param.name,
            Member::Property(prop) => &prop.name,
        }
    }

    pub fn annotation(&self) -> Option<&'a DtsType> {
        match self {
            Member::Param(param) => param.ty.as_ref(),
            Member::Property(prop) => Some(&prop.ty),
        }
    }

    pub fn optional(&self) -> bool {
        match self {
            Member::Param(param) => param.optional,
            Member::Property(prop) => prop.optional,
        }
    }
}

/// Normalize a member into its name and schema.
pub fn normalize(member: Member<'_>) -> Result<(String, ParameterSchema), NormalizeError> {
    let ty = member
        .annotation()
        .ok_or_else(|| NormalizeError::MissingAnnotation {
            member: member.name().to_string(),
        })?;

    let schema = ParameterSchema {
        ty: normalize_type(ty),
        optional: member.optional(),
    };
    Ok((member.name().to_string(), schema))
}

/// Normalize a declared type. Only the top-level union is unwrapped.
pub fn normalize_type(ty: &DtsType) -> TypeSchema {
    match ty {
        DtsType::Union(alternatives) => TypeSchema::Union(alternatives.iter().map(tag).collect()),
        other => TypeSchema::Single(tag(other)),
    }
}

fn tag(ty: &DtsType) -> TypeTag {
    match ty {
        DtsType::Named { name, .. } if name.contains('.') => TypeTag::Unresolved(name.clone()),
        DtsType::Named { name, .. } => TypeTag::Reference(name.clone()),
        DtsType::Primitive(primitive) => TypeTag::Primitive(*primitive),
        other => TypeTag::Opaque(other.kind_label()),
    }
}
