use kiln_descriptor::{DescriptorProto, EnumDescriptor, EnumValueDescriptor, ServiceDescriptor};

use crate::model::Type;

/// Declaration backing a [`Symbol`].
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolValue {
    /// Scalar keyword, no declaration.
    None,
    Bool(bool),
    Str(String),
    Enum(EnumDescriptor),
    EnumValue(EnumValueDescriptor),
    Message(DescriptorProto),
    Service(ServiceDescriptor),
}

/// One resolvable identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Unqualified name used in generated code (`Outer_Inner` for nested types).
    pub name: String,
    /// Package the symbol was declared in.
    pub space: String,
    /// Values (enum members, literals) as opposed to types.
    pub is_value: bool,
    pub ty: Type,
    pub value: SymbolValue,
    /// Descriptor file that declared the symbol.
    pub scope: String,
}
