//! Built-in pipeline phases.
//!
//! - [`ValidatePhase`] - checks the descriptor set and collects diagnostics
//! - [`LowerPhase`] - resolves the main file into models

mod lower;
mod validate;

pub use lower::LowerPhase;
pub use validate::{
    DuplicateImportLint, Lint, MissingGoPackageLint, MissingPackageLint, ValidatePhase,
};
