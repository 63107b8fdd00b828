//! Core utilities and types for the Kiln project generator.
//!
//! This crate provides the generated-file unit handed between the template
//! engine and the persister, naming helpers shared by templates and the
//! model builder, and the import alias allocator.

mod file;
mod unique;
mod utils;

// File operations
pub use file::{GeneratedFile, Overwrite, WriteResult, write_file};
// Alias allocation
pub use unique::UniqueNames;
// String and path utilities
pub use utils::{
    base_name, split_package_name, sub_dir, sub_package, to_lower_camel_case, to_pascal_case,
    to_snake_case,
};
