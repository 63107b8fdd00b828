//! Descriptor types for already-parsed IDL documents.
//!
//! Kiln never parses schema syntax itself. An external front-end (for
//! example `buf build --as-file-descriptor-set -o -#format=json`) produces a
//! `FileDescriptorSet` in protobuf JSON form, which deserializes into the
//! types here.
//!
//! # Architecture
//!
//! ```text
//! .proto → external compiler → kiln-descriptor → resolver → models → templates
//! ```
//!
//! The builder-style constructors (`FileDescriptor::new(...).message(...)`)
//! exist so tests and embedders can assemble descriptor trees by hand.

mod enums;
mod file;
mod message;
mod service;

pub use enums::{EnumDescriptor, EnumValueDescriptor};
pub use file::{DescriptorSet, FileDescriptor, FileOptions};
pub use message::{
    DescriptorProto, FieldDescriptor, FieldLabel, FieldType, MessageOptions, OneofDescriptor,
};
pub use service::{MethodDescriptor, ServiceDescriptor};
