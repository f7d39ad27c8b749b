//! AST types for TypeScript declaration files.

use std::fmt;

/// A parsed .d.ts file containing multiple declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct DtsFile {
    pub items: Vec<DtsItem>,
}

impl DtsFile {
    /// Iterate over top-level class declarations carrying an `export` modifier.
    pub fn exported_classes(&self) -> impl Iterator<Item = &DtsClass> {
        self.items.iter().filter_map(|item| match item {
            DtsItem::Class(class) if class.exported => Some(class),
            _ => None,
        })
    }

    /// Iterate over top-level interface declarations carrying an `export` modifier.
    pub fn exported_interfaces(&self) -> impl Iterator<Item = &DtsInterface> {
        self.items.iter().filter_map(|item| match item {
            DtsItem::Interface(iface) if iface.exported => Some(iface),
            _ => None,
        })
    }
}

/// A top-level declaration in a .d.ts file.
#[derive(Debug, Clone, PartialEq)]
pub enum DtsItem {
    Function(DtsFunction),
    Interface(DtsInterface),
    TypeAlias(DtsTypeAlias),
    Class(DtsClass),
    Variable(DtsVariable),
    Namespace(DtsNamespace),
    Module(DtsModule),
    Export(DtsExport),
}

/// A function declaration: `declare function name<T>(params): ReturnType;`
#[derive(Debug, Clone, PartialEq)]
pub struct DtsFunction {
    pub name: String,
    pub exported: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<DtsType>,
}

/// An interface declaration: `interface Name<T> extends Base { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct DtsInterface {
    pub name: String,
    pub exported: bool,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<DtsType>,
    pub members: Vec<InterfaceMember>,
}

impl DtsInterface {
    /// Property signatures in declaration order; methods and signatures are skipped.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyMember> {
        self.members.iter().filter_map(|member| match member {
            InterfaceMember::Property(prop) => Some(prop),
            _ => None,
        })
    }
}

/// A type alias: `type Name<T> = Type;`
#[derive(Debug, Clone, PartialEq)]
pub struct DtsTypeAlias {
    pub name: String,
    pub exported: bool,
    pub type_params: Vec<TypeParam>,
    pub ty: DtsType,
}

/// A class declaration: `declare class Name<T> extends Base implements Interface { members }`
#[derive(Debug, Clone, PartialEq)]
pub struct DtsClass {
    pub name: String,
    pub exported: bool,
    pub is_abstract: bool,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<DtsType>,
    pub implements: Vec<DtsType>,
    pub members: Vec<ClassMember>,
}

impl DtsClass {
    /// The first constructor declared in the class body.
    pub fn constructor(&self) -> Option<&ConstructSignature> {
        self.members.iter().find_map(|member| match member {
            ClassMember::Constructor(sig) => Some(sig),
            _ => None,
        })
    }
}

/// A variable declaration: `declare const/let/var name: Type;`
#[derive(Debug, Clone, PartialEq)]
pub struct DtsVariable {
    pub name: String,
    pub exported: bool,
    pub ty: DtsType,
    pub is_const: bool,
}

/// A namespace declaration: `declare namespace Name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct DtsNamespace {
    pub name: String,
    pub exported: bool,
    pub items: Vec<DtsItem>,
}

/// A module declaration: `declare module "name" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct DtsModule {
    pub name: String,
    pub items: Vec<DtsItem>,
}

/// An export statement
#[derive(Debug, Clone, PartialEq)]
pub enum DtsExport {
    /// `export = name;`
    Equals(String),
    /// `export default name;`
    Default(String),
    /// `export { name, name2 as alias };` with an optional `from "module"` source
    Named {
        names: Vec<(String, Option<String>)>,
        from: Option<String>,
    },
    /// `export * from "module";`
    All(String),
}

/// A generic type parameter with optional constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    /// Optional constraint: `T extends Foo`
    pub constraint: Option<DtsType>,
    /// Optional default: `T = DefaultType`
    pub default: Option<DtsType>,
}

/// A function/method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    /// `None` when the parameter carries no annotation.
    pub ty: Option<DtsType>,
    pub optional: bool,
    pub rest: bool,
}

/// A member of an interface.
#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMember {
    Property(PropertyMember),
    Method(MethodMember),
    CallSignature(CallSignature),
    ConstructSignature(ConstructSignature),
    IndexSignature(IndexSignature),
}

/// A property in an interface: `name?: Type;`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMember {
    pub name: String,
    pub ty: DtsType,
    pub optional: bool,
    pub readonly: bool,
}

/// A method in an interface: `name<T>(params): ReturnType;`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodMember {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<DtsType>,
    pub optional: bool,
}

/// A call signature: `(params): ReturnType;`
#[derive(Debug, Clone, PartialEq)]
pub struct CallSignature {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<DtsType>,
}

/// A construct signature: `new (params): ReturnType;` or a class `constructor(params);`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructSignature {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<DtsType>,
}

/// An index signature: `[key: string]: Type;`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    pub key_name: String,
    pub key_type: DtsType,
    pub value_type: DtsType,
    pub readonly: bool,
}

/// A member of a class.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Property(ClassProperty),
    Method(ClassMethod),
    Constructor(ConstructSignature),
    IndexSignature(IndexSignature),
}

/// A property in a class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProperty {
    pub name: String,
    pub ty: Option<DtsType>,
    pub optional: bool,
    pub readonly: bool,
    pub is_static: bool,
    pub visibility: Visibility,
}

/// A method in a class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMethod {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<DtsType>,
    pub is_static: bool,
    pub visibility: Visibility,
}

/// Visibility modifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A TypeScript type.
#[derive(Debug, Clone, PartialEq)]
pub enum DtsType {
    /// A named type with optional type arguments: `Promise<T>`, `THREE.Color`
    Named {
        name: String,
        type_args: Vec<DtsType>,
    },
    /// A primitive type: `string`, `number`, `boolean`, `void`, etc.
    Primitive(Primitive),
    /// A string literal type: `"GET"`, `"POST"`
    StringLiteral(String),
    /// A number literal type: `1`, `2`, `3`
    NumberLiteral(String),
    /// A boolean literal type: `true`, `false`
    BooleanLiteral(bool),
    /// A union type: `A | B | C`
    Union(Vec<DtsType>),
    /// An intersection type: `A & B & C`
    Intersection(Vec<DtsType>),
    /// A function type: `(a: T, b: U) => R`
    Function(Box<FunctionType>),
    /// An object literal type: `{ key: Type, key2?: Type2 }`
    Object(Vec<ObjectMember>),
    /// An array type: `T[]`
    Array(Box<DtsType>),
    /// A tuple type: `[T, U, V]`
    Tuple(Vec<TupleElement>),
    /// A typeof type: `typeof foo`
    TypeOf(String),
    /// A keyof type: `keyof T`
    KeyOf(Box<DtsType>),
    /// An indexed access type: `T[K]`
    IndexAccess {
        object: Box<DtsType>,
        index: Box<DtsType>,
    },
    /// A conditional type: `T extends U ? X : Y`
    Conditional {
        check: Box<DtsType>,
        extends: Box<DtsType>,
        true_type: Box<DtsType>,
        false_type: Box<DtsType>,
    },
    /// A mapped type: `{ [K in keyof T]: T[K] }`
    Mapped {
        key_name: String,
        key_constraint: Box<DtsType>,
        value_type: Box<DtsType>,
        readonly: Option<MappedModifier>,
        optional: Option<MappedModifier>,
    },
    /// An infer type: `infer T`
    Infer(String),
    /// A template literal type, kept as source text: `` `${T}px` ``
    TemplateLiteral(String),
    /// A parenthesized type: `(T)`
    Parenthesized(Box<DtsType>),
    /// A this type: `this`
    This,
}

impl DtsType {
    /// Structural kind label of this type expression.
    ///
    /// Primitives report their keyword; every other form reports a stable
    /// node-kind name (`ArrayType`, `FunctionType`, ...).
    pub fn kind_label(&self) -> String {
        let label = match self {
            DtsType::Primitive(p) => return p.to_string(),
            DtsType::Named { .. } => "TypeReference",
            DtsType::StringLiteral(_) | DtsType::NumberLiteral(_) | DtsType::BooleanLiteral(_) => {
                "LiteralType"
            }
            DtsType::Union(_) => "UnionType",
            DtsType::Intersection(_) => "IntersectionType",
            DtsType::Function(_) => "FunctionType",
            DtsType::Object(_) => "TypeLiteral",
            DtsType::Array(_) => "ArrayType",
            DtsType::Tuple(_) => "TupleType",
            DtsType::TypeOf(_) => "TypeQuery",
            DtsType::KeyOf(_) => "TypeOperator",
            DtsType::IndexAccess { .. } => "IndexedAccessType",
            DtsType::Conditional { .. } => "ConditionalType",
            DtsType::Mapped { .. } => "MappedType",
            DtsType::Infer(_) => "InferType",
            DtsType::TemplateLiteral(_) => "TemplateLiteralType",
            DtsType::Parenthesized(_) => "ParenthesizedType",
            DtsType::This => "ThisType",
        };
        label.to_string()
    }
}

/// A primitive TypeScript type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Void,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Object,
    Symbol,
    BigInt,
}

impl Primitive {
    /// Look up a primitive by its keyword spelling.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let p = match keyword {
            "string" => Primitive::String,
            "number" => Primitive::Number,
            "boolean" => Primitive::Boolean,
            "void" => Primitive::Void,
            "null" => Primitive::Null,
            "undefined" => Primitive::Undefined,
            "any" => Primitive::Any,
            "unknown" => Primitive::Unknown,
            "never" => Primitive::Never,
            "object" => Primitive::Object,
            "symbol" => Primitive::Symbol,
            "bigint" => Primitive::BigInt,
            _ => return None,
        };
        Some(p)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String => write!(f, "string"),
            Primitive::Number => write!(f, "number"),
            Primitive::Boolean => write!(f, "boolean"),
            Primitive::Void => write!(f, "void"),
            Primitive::Null => write!(f, "null"),
            Primitive::Undefined => write!(f, "undefined"),
            Primitive::Any => write!(f, "any"),
            Primitive::Unknown => write!(f, "unknown"),
            Primitive::Never => write!(f, "never"),
            Primitive::Object => write!(f, "object"),
            Primitive::Symbol => write!(f, "symbol"),
            Primitive::BigInt => write!(f, "bigint"),
        }
    }
}

/// A function type: `(params) => ReturnType`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Box<DtsType>,
}

/// A member of an object literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    Property {
        name: String,
        ty: DtsType,
        optional: bool,
        readonly: bool,
    },
    Method {
        name: String,
        type_params: Vec<TypeParam>,
        params: Vec<Param>,
        return_type: Option<DtsType>,
        optional: bool,
    },
    CallSignature(CallSignature),
    ConstructSignature(ConstructSignature),
    IndexSignature(IndexSignature),
}

/// An element in a tuple type.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub ty: DtsType,
    pub name: Option<String>,
    pub optional: bool,
    pub rest: bool,
}

/// A modifier in a mapped type: `+`, `-`, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedModifier {
    Add,
    Remove,
    Preserve,
}
