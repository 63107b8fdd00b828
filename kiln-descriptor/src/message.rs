use serde::{Deserialize, Serialize};

use crate::EnumDescriptor;

/// A message declaration, possibly with nested messages and enums.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DescriptorProto {
    pub name: String,
    pub field: Vec<FieldDescriptor>,
    pub nested_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptor>,
    pub oneof_decl: Vec<OneofDescriptor>,
    pub options: Option<MessageOptions>,
}

impl DescriptorProto {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.field.push(field);
        self
    }

    pub fn nested(mut self, message: DescriptorProto) -> Self {
        self.nested_type.push(message);
        self
    }

    pub fn enumeration(mut self, e: EnumDescriptor) -> Self {
        self.enum_type.push(e);
        self
    }

    pub fn oneof(mut self, name: impl Into<String>) -> Self {
        self.oneof_decl.push(OneofDescriptor { name: name.into() });
        self
    }

    /// A synthetic map entry: exactly two fields named `key` and `value`.
    pub fn is_map_entry(&self) -> bool {
        matches!(self.field.as_slice(), [k, v] if k.name == "key" && v.name == "value")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageOptions {
    pub map_entry: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OneofDescriptor {
    pub name: String,
}

/// A single field of a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: i32,
    pub label: FieldLabel,
    pub r#type: FieldType,
    /// Fully qualified referenced type (`.pkg.Message`) for messages and enums.
    pub type_name: String,
    pub json_name: Option<String>,
    pub oneof_index: Option<i32>,
    pub proto3_optional: Option<bool>,
}

impl FieldDescriptor {
    /// A scalar field.
    pub fn scalar(name: impl Into<String>, number: i32, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            r#type: ty,
            ..Self::default()
        }
    }

    /// A message-typed field referencing `type_name`.
    pub fn message(name: impl Into<String>, number: i32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            r#type: FieldType::Message,
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// An enum-typed field referencing `type_name`.
    pub fn enumeration(name: impl Into<String>, number: i32, type_name: impl Into<String>) -> Self {
        Self {
            r#type: FieldType::Enum,
            ..Self::message(name, number, type_name)
        }
    }

    pub fn repeated(mut self) -> Self {
        self.label = FieldLabel::Repeated;
        self
    }

    pub fn in_oneof(mut self, index: i32) -> Self {
        self.oneof_index = Some(index);
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }

    /// Member of a real oneof (proto3 optional fields use a synthetic one).
    pub fn oneof(&self) -> Option<usize> {
        if self.proto3_optional == Some(true) {
            return None;
        }
        self.oneof_index.and_then(|i| usize::try_from(i).ok())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldLabel {
    #[default]
    #[serde(rename = "LABEL_OPTIONAL")]
    Optional,
    #[serde(rename = "LABEL_REQUIRED")]
    Required,
    #[serde(rename = "LABEL_REPEATED")]
    Repeated,
}

/// Wire type of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "TYPE_DOUBLE")]
    Double,
    #[serde(rename = "TYPE_FLOAT")]
    Float,
    #[serde(rename = "TYPE_INT64")]
    Int64,
    #[serde(rename = "TYPE_UINT64")]
    Uint64,
    #[serde(rename = "TYPE_INT32")]
    Int32,
    #[serde(rename = "TYPE_FIXED64")]
    Fixed64,
    #[serde(rename = "TYPE_FIXED32")]
    Fixed32,
    #[serde(rename = "TYPE_BOOL")]
    Bool,
    #[default]
    #[serde(rename = "TYPE_STRING")]
    String,
    #[serde(rename = "TYPE_GROUP")]
    Group,
    #[serde(rename = "TYPE_MESSAGE")]
    Message,
    #[serde(rename = "TYPE_BYTES")]
    Bytes,
    #[serde(rename = "TYPE_UINT32")]
    Uint32,
    #[serde(rename = "TYPE_ENUM")]
    Enum,
    #[serde(rename = "TYPE_SFIXED32")]
    Sfixed32,
    #[serde(rename = "TYPE_SFIXED64")]
    Sfixed64,
    #[serde(rename = "TYPE_SINT32")]
    Sint32,
    #[serde(rename = "TYPE_SINT64")]
    Sint64,
}

impl FieldType {
    /// Whether the field refers to a named type instead of a scalar.
    pub fn is_reference(self) -> bool {
        matches!(self, FieldType::Message | FieldType::Enum | FieldType::Group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_map_entry() {
        let entry = DescriptorProto::new("LabelsEntry")
            .field(FieldDescriptor::scalar("key", 1, FieldType::String))
            .field(FieldDescriptor::scalar("value", 2, FieldType::Int32));
        assert!(entry.is_map_entry());

        let swapped = DescriptorProto::new("Pair")
            .field(FieldDescriptor::scalar("value", 1, FieldType::String))
            .field(FieldDescriptor::scalar("key", 2, FieldType::String));
        assert!(!swapped.is_map_entry());

        let three = entry
            .clone()
            .field(FieldDescriptor::scalar("extra", 3, FieldType::Bool));
        assert!(!three.is_map_entry());
    }

    #[test]
    fn test_proto3_optional_is_not_a_oneof() {
        let mut field = FieldDescriptor::scalar("nickname", 4, FieldType::String).in_oneof(0);
        assert_eq!(field.oneof(), Some(0));

        field.proto3_optional = Some(true);
        assert_eq!(field.oneof(), None);
    }
}
