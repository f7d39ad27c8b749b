//! Locating the declaration that carries an entity's parameters.

use paramscope_dts::{ConstructSignature, DtsClass, DtsFile, DtsInterface, DtsType};

use crate::error::ResolveError;

/// Category of an entity, decided by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Material,
    Geometry,
    Unrecognized,
}

impl EntityKind {
    /// `Material` wins over `Geometry` when a name contains both.
    /// Only the entity name is inspected; the declaration file's path is ignored.
    pub fn classify(name: &str) -> Self {
        if name.contains("Material") {
            EntityKind::Material
        } else if name.contains("Geometry") {
            EntityKind::Geometry
        } else {
            EntityKind::Unrecognized
        }
    }
}

/// Where an entity's parameters come from.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    /// No class matched; an exported interface carries the target's exact name.
    DirectInterface(&'a DtsInterface),
    /// The constructor takes a `<Target>Parameters` option bag.
    /// `params` is `None` when the file does not declare that interface.
    ClassWithNestedParams {
        class: &'a DtsClass,
        interface_name: String,
        params: Option<&'a DtsInterface>,
    },
    /// Constructor parameters are the entity's parameters.
    ClassDirectParams {
        class: &'a DtsClass,
        constructor: &'a ConstructSignature,
    },
    /// The option bag is a type declared elsewhere.
    ClassExternalParams {
        class: &'a DtsClass,
        type_name: String,
    },
    /// Nothing in the file matches the target.
    NotFound,
    Unrecognized,
}

/// Resolve `target` within a parsed declaration file.
pub fn resolve<'a>(file: &'a DtsFile, target: &str) -> Result<Resolution<'a>, ResolveError> {
    let kind = EntityKind::classify(target);
    if kind == EntityKind::Unrecognized {
        return Ok(Resolution::Unrecognized);
    }

    let Some(class) = find_class(file, target) else {
        return Ok(match find_interface(file, target) {
            Some(iface) => Resolution::DirectInterface(iface),
            None => Resolution::NotFound,
        });
    };

    let constructor = class
        .constructor()
        .ok_or_else(|| ResolveError::MissingConstructor {
            entity: target.to_string(),
            class: class.name.clone(),
        })?;

    if kind == EntityKind::Geometry {
        return Ok(Resolution::ClassDirectParams { class, constructor });
    }

    let Some(first) = constructor.params.first() else {
        return Ok(Resolution::ClassDirectParams { class, constructor });
    };

    match &first.ty {
        Some(DtsType::Named { name, .. }) => {
            let interface_name = format!("{target}Parameters");
            if *name == interface_name {
                let params = find_interface(file, &interface_name);
                Ok(Resolution::ClassWithNestedParams {
                    class,
                    interface_name,
                    params,
                })
            } else {
                Ok(Resolution::ClassExternalParams {
                    class,
                    type_name: name.clone(),
                })
            }
        }
        other => Err(ResolveError::UnnamedParameterType {
            entity: target.to_string(),
            param: first.name.clone(),
            kind: other
                .as_ref()
                .map_or_else(|| "no annotation".to_string(), DtsType::kind_label),
        }),
    }
}

/// The exported class named exactly `target`, else the first whose name contains it.
fn find_class<'a>(file: &'a DtsFile, target: &str) -> Option<&'a DtsClass> {
    file.exported_classes()
        .find(|c| c.name == target)
        .or_else(|| file.exported_classes().find(|c| c.name.contains(target)))
}

fn find_interface<'a>(file: &'a DtsFile, name: &str) -> Option<&'a DtsInterface> {
    file.exported_interfaces().find(|iface| iface.name == name)
}
