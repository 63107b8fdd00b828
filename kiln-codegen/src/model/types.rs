//! Semantic types produced by the resolver.
//!
//! Base scalar types are process-wide immutable singletons. Anything that
//! needs a variation of them (a list element, an enum-valued integer, a type
//! bound to the model that owns it) is created with one of the `with_*`
//! derivations, which copy and never touch the original.

use std::sync::LazyLock;

use kiln_descriptor::FieldType;
use serde::Serialize;

use super::ModelId;

/// Representation kind, deciding how a type is laid out in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Int,
    Float64,
    String,
    Slice,
    Map,
    Struct,
    Func,
    Interface,
}

/// Semantic category, deciding which emission branch applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[default]
    Plain,
    List,
    Map,
    Set,
    Enum,
    Struct,
    Oneof,
    Binary,
    Service,
}

/// Where a type is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scope {
    /// Built into the target language.
    Base,
    /// Declared by a generated model.
    Model(ModelId),
    /// Declared, but not yet bound to a model.
    Unbound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Type {
    name: String,
    kind: Kind,
    category: Category,
    elements: Vec<Type>,
    scope: Scope,
    indirect: bool,
    has_new: bool,
}

impl Type {
    fn base(name: &str, kind: Kind, category: Category) -> Self {
        Self {
            name: name.to_string(),
            kind,
            category,
            elements: Vec::new(),
            scope: Scope::Base,
            indirect: false,
            has_new: false,
        }
    }

    /// An enum declared in a schema file.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Int,
            category: Category::Enum,
            elements: Vec::new(),
            scope: Scope::Base,
            indirect: false,
            has_new: true,
        }
    }

    /// A message declared in a schema file.
    pub fn structure(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Struct,
            category: Category::Struct,
            elements: Vec::new(),
            scope: Scope::Unbound,
            indirect: false,
            has_new: true,
        }
    }

    /// A service declared in a schema file.
    pub fn service(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Func,
            category: Category::Service,
            elements: Vec::new(),
            scope: Scope::Unbound,
            indirect: false,
            has_new: false,
        }
    }

    /// The interface standing in for a oneof group.
    pub fn oneof(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Interface,
            category: Category::Oneof,
            elements: Vec::new(),
            scope: Scope::Base,
            indirect: false,
            has_new: true,
        }
    }

    /// A list of `element`.
    pub fn list_of(element: Type) -> Self {
        LIST.with_elements(vec![element])
    }

    /// A map from `key` to `value`.
    pub fn map_of(key: Type, value: Type) -> Self {
        MAP.with_elements(vec![key, value])
    }

    /// Copy with a different category.
    pub fn with_category(&self, category: Category) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    /// Copy with a different scope.
    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    /// Copy with different element types.
    pub fn with_elements(&self, elements: Vec<Type>) -> Self {
        Self {
            elements,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn elements(&self) -> &[Type] {
        &self.elements
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_indirect(&self) -> bool {
        self.indirect
    }

    pub fn has_new(&self) -> bool {
        self.has_new
    }

    pub fn is_base(&self) -> bool {
        self.scope == Scope::Base && !self.has_new
    }
}

pub static BOOL: LazyLock<Type> = LazyLock::new(|| Type::base("bool", Kind::Bool, Category::Plain));
pub static BYTE: LazyLock<Type> = LazyLock::new(|| Type::base("byte", Kind::Int8, Category::Plain));
pub static INT32: LazyLock<Type> =
    LazyLock::new(|| Type::base("int32", Kind::Int32, Category::Plain));
pub static INT64: LazyLock<Type> =
    LazyLock::new(|| Type::base("int64", Kind::Int64, Category::Plain));
pub static UINT32: LazyLock<Type> =
    LazyLock::new(|| Type::base("uint32", Kind::Int32, Category::Plain));
pub static UINT64: LazyLock<Type> =
    LazyLock::new(|| Type::base("uint64", Kind::Int64, Category::Plain));
pub static INT: LazyLock<Type> = LazyLock::new(|| Type::base("int", Kind::Int, Category::Plain));
pub static FLOAT32: LazyLock<Type> =
    LazyLock::new(|| Type::base("float32", Kind::Float64, Category::Plain));
pub static FLOAT64: LazyLock<Type> =
    LazyLock::new(|| Type::base("float64", Kind::Float64, Category::Plain));
pub static STRING: LazyLock<Type> =
    LazyLock::new(|| Type::base("string", Kind::String, Category::Plain));
pub static BINARY: LazyLock<Type> = LazyLock::new(|| {
    Type::base("binary", Kind::Slice, Category::Binary).with_elements(vec![BYTE.clone()])
});
pub static LIST: LazyLock<Type> = LazyLock::new(|| Type::base("list", Kind::Slice, Category::List));
pub static MAP: LazyLock<Type> = LazyLock::new(|| Type::base("map", Kind::Map, Category::Map));
pub static SET: LazyLock<Type> = LazyLock::new(|| Type::base("set", Kind::Slice, Category::Set));

/// Base type for a scalar wire type; `None` for messages, enums and groups.
pub fn scalar(ty: FieldType) -> Option<&'static Type> {
    let base: &'static LazyLock<Type> = match ty {
        FieldType::Bool => &BOOL,
        FieldType::Uint32 | FieldType::Fixed32 => &UINT32,
        FieldType::Uint64 | FieldType::Fixed64 => &UINT64,
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => &INT32,
        FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => &INT64,
        FieldType::Double => &FLOAT64,
        FieldType::Float => &FLOAT32,
        FieldType::String => &STRING,
        FieldType::Bytes => &BINARY,
        FieldType::Message | FieldType::Enum | FieldType::Group => return None,
    };
    Some(LazyLock::force(base))
}

/// Base type named by a scalar keyword, as seeded into every namespace.
pub fn scalar_keyword(keyword: &str) -> Option<&'static Type> {
    let ty = match keyword {
        "bool" => FieldType::Bool,
        "uint32" => FieldType::Uint32,
        "fixed32" => FieldType::Fixed32,
        "uint64" => FieldType::Uint64,
        "fixed64" => FieldType::Fixed64,
        "int32" => FieldType::Int32,
        "sint32" => FieldType::Sint32,
        "sfixed32" => FieldType::Sfixed32,
        "int64" => FieldType::Int64,
        "sint64" => FieldType::Sint64,
        "sfixed64" => FieldType::Sfixed64,
        "double" => FieldType::Double,
        "float" => FieldType::Float,
        "string" => FieldType::String,
        "bytes" => FieldType::Bytes,
        _ => return None,
    };
    scalar(ty)
}

/// Scalar keywords seeded into every namespace.
pub const SCALAR_KEYWORDS: [&str; 15] = [
    "bool", "uint32", "uint64", "fixed32", "fixed64", "int32", "int64", "sint32", "sint64",
    "sfixed32", "sfixed64", "double", "float", "string", "bytes",
];
