//! Generated output units and the types they reference.

mod graph;
pub mod types;

pub use graph::{Enum, EnumValue, Field, Model, ModelGraph, ModelId, Oneof, Struct};
pub use types::{Category, Kind, Scope, Type};
