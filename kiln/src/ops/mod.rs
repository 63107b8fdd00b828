//! Core operations.
//!
//! This module contains the business logic for kiln commands,
//! separated from CLI argument parsing and output rendering.

pub mod generate;

pub use generate::{PackageRequest, Settings, generate_package, new_project};
