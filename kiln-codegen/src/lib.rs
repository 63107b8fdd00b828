// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Descriptor resolution, model graph and template engine for Kiln.
//!
//! # Module Organization
//!
//! - [`resolve`] - Per-file symbol tables and identifier resolution
//! - [`model`] / [`lower`] - Models built from resolved descriptors
//! - [`emit`] - Cycle-safe model emission with package relocation
//! - [`template`] - Layout configuration, rendering and built-in templates
//! - [`update`] - Merging regenerated content into existing files
//! - [`persist`] / [`lint`] - Writing the rendered files
//! - [`pipeline`] - Validate and lower phases with plugin hooks
//! - [`package`] / [`layout`] - Package and project skeleton generation
//! - [`compiler`] - Running the external schema compiler

pub mod compiler;
pub mod emit;
mod error;
pub mod layout;
pub mod lint;
pub mod lower;
pub mod model;
pub mod package;
pub mod persist;
pub mod pipeline;
pub mod resolve;
pub mod template;
pub mod update;

pub use compiler::{ExternalCompiler, read_descriptor_set};
pub use error::{Error, Result};
pub use layout::{LayoutGenerator, LayoutOptions};
pub use package::{PackageGenerator, PackageOptions, PackageOutput};
pub use persist::{FileStatus, PersistedFile, Persister};
