//! Identifier resolution over a descriptor set.
//!
//! A [`Resolver`] is built per schema file. It indexes the file's own
//! declarations and those of its direct imports, turns field references into
//! [`Type`](crate::model::Type)s, and records which imports were used so the
//! generated model only imports what it needs.

mod namespace;
mod package;
mod resolver;
mod symbol;

pub use namespace::Namespace;
pub use package::{PackageReference, PackageRules, is_well_known};
pub use resolver::{Resolved, Resolver};
pub use symbol::{Symbol, SymbolValue};
